//! Non-local control transfer: `return` and raised exceptions.
//!
//! At most one interrupt is in flight. Statement execution stops as soon
//! as one is set and unwinds until a call boundary consumes a return or a
//! `try` whose handler was chosen at raise time consumes an exception.

use pyl_ir::NodeId;
use pyl_object::ExcType;

use crate::value::Value;

/// The handler an exception was routed to when it was raised.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HandlerTarget {
    /// Call depth of the frame whose `try` catches it.
    pub frame: usize,
    /// The `ExceptHandler` node.
    pub handler: NodeId,
}

#[derive(Debug)]
pub enum Interrupt {
    Return(Value),
    Exception {
        exc: ExcType,
        message: String,
        /// `None` when no simulated handler catches it.
        target: Option<HandlerTarget>,
    },
}

#[derive(Debug, Default)]
pub struct InterruptManager {
    context: Option<Interrupt>,
}

impl InterruptManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.context.is_some()
    }

    pub fn context(&self) -> Option<&Interrupt> {
        self.context.as_ref()
    }

    pub fn returns(&mut self, value: Value) {
        debug_assert!(self.context.is_none(), "interrupt raised while another is active");
        self.context = Some(Interrupt::Return(value));
    }

    pub fn throw(&mut self, exc: ExcType, message: String, target: Option<HandlerTarget>) {
        debug_assert!(self.context.is_none(), "interrupt raised while another is active");
        self.context = Some(Interrupt::Exception { exc, message, target });
    }

    /// Put back an interrupt that was set aside, as `finally` does.
    pub fn resume(&mut self, interrupt: Interrupt) {
        debug_assert!(self.context.is_none(), "interrupt raised while another is active");
        self.context = Some(interrupt);
    }

    pub fn take(&mut self) -> Option<Interrupt> {
        self.context.take()
    }

    /// The handler of `handlers`, run by the `try` in `frame`, that the
    /// pending exception was routed to.
    pub fn reaches(&self, frame: usize, handlers: &[NodeId]) -> Option<NodeId> {
        match &self.context {
            Some(Interrupt::Exception {
                target: Some(target), ..
            }) if target.frame == frame && handlers.contains(&target.handler) => Some(target.handler),
            _ => None,
        }
    }
}
