//! Document ingestion: splitting raw documents into embeddable chunks

pub mod chunker;

pub use chunker::TextChunker;
