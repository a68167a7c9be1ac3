use crate::models::{ChatMessage, CrawlResult};

/// Fixed report instruction. Field names must match what `parse` reads.
pub fn system_prompt(insight_count: usize) -> String {
    format!(
        r#"You are a business research expert. Analyze the provided data and generate a comprehensive research report with the following structure:
1. Main Points: Extract {insight_count} key insights, each with a title, detailed content, and relevant source URLs
2. FAQ: Generate relevant questions and answers based on the data
3. Related Topics: Suggest related research topics
4. Useful Links: Provide relevant links with titles and descriptions

Format your response as a JSON object with these exact keys: mainPoints (array of {{title, content, sources}}), faq (array of {{question, answer}}), relatedTopics (array of strings), links (array of {{url, title, description}})"#
    )
}

pub fn user_prompt(topic: &str, crawl: &CrawlResult) -> String {
    format!(
        "Generate a detailed research report about {} using this data: {}",
        topic, crawl.0
    )
}

pub fn compose(topic: &str, crawl: &CrawlResult, insight_count: usize) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_prompt(insight_count)),
        ChatMessage::user(user_prompt(topic, crawl)),
    ]
}
