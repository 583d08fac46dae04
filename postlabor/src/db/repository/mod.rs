mod research;

pub use research::ResearchRepository;
pub(crate) use research::format_timestamp;
