use crate::conversation::ChatTurn;

/// Fixed persona and style rules placed ahead of the record context.
pub const SYSTEM_PREAMBLE: &str = "You are a helpful assistant for an assignment management system. \
Be concise, direct, and brief in your responses.\n\
Keep responses under 100 words unless the user specifically asks for more detail.\n\
Use the provided context about assignments and submissions to answer questions.\n\
If you don't have relevant information, politely say so.\n\
Focus on actionable insights and key information.";

#[must_use]
pub fn build_system_prompt(context: &str) -> String {
    format!("{SYSTEM_PREAMBLE}{context}")
}

/// System instruction first, then the retained history in order.
#[must_use]
pub fn build_messages(system_prompt: String, history: Vec<ChatTurn>) -> Vec<ChatTurn> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ChatTurn::system(system_prompt));
    messages.extend(history);
    messages
}
