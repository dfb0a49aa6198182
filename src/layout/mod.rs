pub(crate) mod anchor;
pub(crate) mod bounds;
pub(crate) mod fit;
