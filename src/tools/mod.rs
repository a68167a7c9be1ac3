pub mod firecrawl;
pub mod llm;
