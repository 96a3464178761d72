//! Picks the capability that displays an artifact and normalizes content for it.

use crate::adapters::Adapter;
use crate::artifact::RawContent;
use crate::content::CanonicalContent;
use crate::registry::{AdapterRegistry, Capability};
use crate::type_tag::TypeTag;

/// Capability chosen for a piece of content, with the content in that capability's shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub capability: Capability,
    pub content: CanonicalContent,
}

/// Resolves the capability and content for one artifact.
///
/// An explicit choice that names a known capability wins. Otherwise the type's default is used,
/// and types without a profile fall back to the document capability with pass-through content.
/// Unknown choices are ignored rather than rejected.
pub fn resolve(
    registry: &AdapterRegistry,
    tag: &TypeTag,
    raw: &RawContent,
    choice: Option<&str>,
) -> Resolution {
    let explicit = choice.and_then(|c| match c.parse::<Capability>() {
        Ok(capability) => Some(capability),
        Err(err) => {
            tracing::debug!("ignoring display choice for {tag}: {err}");
            None
        }
    });
    resolve_with(registry, tag, raw, explicit)
}

/// Same as [`resolve`] with an already-parsed choice.
pub fn resolve_with(
    registry: &AdapterRegistry,
    tag: &TypeTag,
    raw: &RawContent,
    choice: Option<Capability>,
) -> Resolution {
    let profile = registry.profile(tag);
    let capability = choice.unwrap_or_else(|| profile.default_capability());

    let own_shape = profile.adapter.category() == capability.category();
    let pass_through = profile.adapter == Adapter::Identity && choice.is_none();
    let adapter = if own_shape || pass_through {
        profile.adapter
    } else {
        Adapter::freeform(capability.category())
    };

    Resolution {
        capability,
        content: adapter.apply(raw),
    }
}

/// Capabilities a type can be displayed with, default first.
pub fn available_capabilities(registry: &AdapterRegistry, tag: &TypeTag) -> Vec<Capability> {
    registry.profile(tag).capabilities().to_vec()
}

/// Whether `choice` is one of the type's listed capabilities.
pub fn is_valid_choice(registry: &AdapterRegistry, tag: &TypeTag, choice: Capability) -> bool {
    registry.profile(tag).capabilities().contains(&choice)
}
