pub use span::Span;
pub use strand::Strand;

mod span;
mod strand;
