pub(crate) mod chroma_key;
pub(crate) mod composite;
