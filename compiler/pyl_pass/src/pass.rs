//! The [`Pass`] trait.

use pyl_ir::Tree;

use crate::config::OptLevel;
use crate::context::{InitContext, PassContext};
use crate::unit::UnitView;

/// One named tree rewrite, run every cycle until the pipeline reaches a
/// fixed point.
///
/// A cycle calls, for each unit, [`Pass::on_pre_transform`], then
/// [`Pass::transform`], then [`Pass::on_post_transform`], all with the
/// same [`PassContext`]. Every rewrite must be counted with
/// [`PassContext::done`]; a cycle in which no pass counts anything ends the
/// run. State kept across calls must be reset per unit, since one pass
/// instance serves every unit.
pub trait Pass {
    fn name(&self) -> &'static str;

    /// Lowest optimization level at which the pass runs.
    fn level(&self) -> OptLevel;

    /// Post passes run once per unit after the fixed point is reached.
    fn is_post(&self) -> bool {
        false
    }

    /// Called once, when the pass is registered.
    fn init(&mut self, _cx: &InitContext<'_>) {}

    /// Called for every unit that parsed, skipped units included.
    fn on_parse_unit(&mut self, _unit: &UnitView<'_>, _tree: &Tree) {}

    fn on_pre_transform(&mut self, _cx: &mut PassContext<'_>) {}

    fn transform(&mut self, cx: &mut PassContext<'_>, tree: &mut Tree);

    fn on_post_transform(&mut self, _cx: &mut PassContext<'_>, _tree: &mut Tree) {}
}
