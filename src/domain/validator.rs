//! Structural pre-flight checks over a classified document.

use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::kind::NodeType;
use crate::domain::node::ComponentNode;

const NO_PREVIOUS: &str = "<none>";

/// Check the depth rules for each consecutive pair of components.
///
/// `components` yields the 1-based line (or row) number of each component in
/// document order; configuration entries are not part of the sequence. A
/// missing previous component counts as level 0, so the first component has to
/// be a level-1 paragraph.
///
/// Whenever the current component is deeper than the previous one it must be a
/// paragraph, and exactly one level deeper.
///
/// # Errors
/// - `ModifierMustAttachAtSiblingLevel`
/// - `ExcessiveDepthJump`
#[instrument(level = "debug", skip(components))]
pub fn validate_structure<'a, K, I>(components: I) -> DomainResult<()>
where
    K: NodeType + 'a,
    I: IntoIterator<Item = (usize, &'a ComponentNode<K>)>,
{
    let mut previous: Option<&ComponentNode<K>> = None;
    let mut checked = 0usize;

    for (line, current) in components {
        let previous_level = previous.map_or(0, ComponentNode::level);
        if current.level() > previous_level {
            let describe = || {
                (
                    previous.map_or_else(|| NO_PREVIOUS.to_string(), ToString::to_string),
                    current.to_string(),
                )
            };
            if current.is_modifier() {
                let (previous, current) = describe();
                return Err(DomainError::ModifierMustAttachAtSiblingLevel {
                    line,
                    previous,
                    current,
                });
            }
            if current.level() != previous_level + 1 {
                let (previous, current) = describe();
                return Err(DomainError::ExcessiveDepthJump {
                    line,
                    previous,
                    current,
                });
            }
        }
        previous = Some(current);
        checked += 1;
    }

    debug!(checked, "structure is valid");
    Ok(())
}
