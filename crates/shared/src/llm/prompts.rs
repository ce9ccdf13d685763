pub const ROUTING_TEMPERATURE: f64 = 0.3;

pub const ROUTING_SYSTEM_PROMPT: &str = "\
Analyse the user query. If it is better answered with an image and text, use both the \
generate_image and get_answer functions. Depending on the query you can use both functions \
or only get_answer. You must use the get_answer function to respond to the query.
Sample questions for which you should use both functions:
- what is a stop sign?
- what is a heart?
- how does the human skeleton look?
- what is a beautiful natural scene?";

pub const ANSWER_SYSTEM_PROMPT: &str = "\
Answer with a bit of detailed explanation. The question could be casual or specific.";

#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    pub system_prompt: &'static str,
    pub temperature: Option<f64>,
}

pub const fn routing_template() -> PromptTemplate {
    PromptTemplate {
        system_prompt: ROUTING_SYSTEM_PROMPT,
        temperature: Some(ROUTING_TEMPERATURE),
    }
}

pub const fn answer_template() -> PromptTemplate {
    PromptTemplate {
        system_prompt: ANSWER_SYSTEM_PROMPT,
        temperature: None,
    }
}
