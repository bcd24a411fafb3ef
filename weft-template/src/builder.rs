use tracing::debug;
use weft_dom::Tree;

use crate::bind_map::BindMap;
use crate::context::Context;
use crate::update::update;

/// Initial render: run the update for every bound key against the freshly
/// parsed tree.
pub fn build(map: &BindMap, mut tree: Tree, ctx: &Context) -> Tree {
    let mut applied = 0;
    for key in map.keys() {
        applied += update(key, &mut tree, map, ctx);
    }
    debug!(keys = map.len(), patches = applied, "built template");
    tree
}
