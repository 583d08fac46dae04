mod scheduler;

pub use scheduler::ResearchScheduler;
