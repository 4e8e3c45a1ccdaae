// Embeddings — word vector maps, file loading and vocabulary intersection.

pub mod loader;
pub mod map;
pub mod vocabulary;
