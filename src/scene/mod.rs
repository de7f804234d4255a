pub(crate) mod composer;
pub(crate) mod layer;
pub(crate) mod style;
