/// Evergreen topics researched in standard mode.
pub const DEFAULT_RESEARCH_TOPICS: &[&str] = &[
    "AI job automation statistics 2025",
    "Universal Basic Income UBI trials results 2025",
    "robot taxation policy proposals 2025",
    "AI workforce displacement news today",
    "post-labor economics developments 2025",
];

/// Time-sensitive queries polled in news mode.
pub const DEFAULT_NEWS_QUERIES: &[&str] = &[
    "AI layoffs today",
    "AI workforce displacement news today",
    "company replaces workers with AI this week",
    "universal basic income pilot news",
    "robot tax legislation news",
    "automation job losses this week",
    "AI hiring freeze announcement",
    "labor union AI agreement news",
];
