//! Job categories and text-pair assembly

/// Output classes of the job recommendation model, in logit order.
///
/// Index `i` of the model's logit vector scores `JOB_CATEGORIES[i]`. The
/// model artifact does not carry these names, so the order here must match
/// the order the model was fine-tuned with.
pub const JOB_CATEGORIES: [&str; 14] = [
    "Software Engineer",
    "Data Scientist",
    "ML Engineer",
    "Cloud Engineer",
    "Security Engineer",
    "DevOps Engineer",
    "Product Manager",
    "Data Analyst",
    "AI Researcher",
    "Backend Developer",
    "Frontend Developer",
    "Full Stack Developer",
    "Mobile Developer",
    "System Administrator",
];

/// Tokenizer special token marking the boundary between the two segments
pub const SEQUENCE_SEPARATOR: &str = "[SEP]";

/// Owned copy of [`JOB_CATEGORIES`]
pub fn default_categories() -> Vec<String> {
    JOB_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

/// Join profile and job description into the single text the model reads.
pub fn combine_text(user_profile: &str, job_description: &str) -> String {
    format!("{} {} {}", user_profile, SEQUENCE_SEPARATOR, job_description)
}
