//! Planning prompt and plan grammar.
//!
//! The generation service is asked to answer with:
//!
//! ```text
//! [BEG_PLANNING]
//! [BEG_AGENT : Name]
//! one task per line
//! [END_AGENT]
//! ...
//! [END_PLANNING]
//! ```
//!
//! [`Plan::parse`] tokenizes the four markers and splits each agent body into
//! lines. The prompt and the parser share the marker constants below and must
//! change together.

const BEG_PLANNING: &str = "[BEG_PLANNING]";
const END_PLANNING: &str = "[END_PLANNING]";
const BEG_AGENT: &str = "[BEG_AGENT";
const END_AGENT: &str = "[END_AGENT]";

/// Instruction sent to the generation service, naming the crew members.
pub fn planning_prompt(crew_names: &[&str]) -> String {
    format!(
        "You have a mission to accomplish.\n\
         Create a planning for only the following crew members:\n\
         {crew}.\n\
         Expected output format is a list of tasks assigned to each crew member.\n\
         Example:\n\
         {BEG_PLANNING}\n\
         {BEG_AGENT} : Agent1 Name]\n\
         Task 1\n\
         Task 2\n\
         Task 3\n\
         ...\n\
         {END_AGENT}\n\
         {BEG_AGENT} : Agent2 Name]\n\
         Task 4\n\
         Task 5\n\
         ...\n\
         {END_AGENT}\n\
         ...\n\
         {END_PLANNING}\n\
         Do not add extra information or any introduction.\n",
        crew = crew_names.join(", "),
    )
}

/// Sub-tasks parsed for one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub agent: String,
    pub tasks: Vec<String>,
}

/// Agent name to sub-task lines, in first-encounter order of each name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    assignments: Vec<Assignment>,
}

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    BeginPlanning,
    EndPlanning,
    BeginAgent(&'a str),
    EndAgent,
    Text(&'a str),
}

impl Plan {
    /// Parse plan text. Input without any complete agent block yields an
    /// empty plan.
    ///
    /// - A `[BEG_AGENT ...]` header with no `[END_AGENT]` before the next
    ///   header (or the end of input) is discarded.
    /// - Blank lines are dropped and every remaining line is trimmed.
    /// - Repeated agent names concatenate their tasks.
    pub fn parse(text: &str) -> Self {
        let mut plan = Plan::default();
        let mut open: Option<(&str, String)> = None;

        for token in tokenize(text) {
            match token {
                Token::BeginAgent(name) => {
                    if let Some((unterminated, _)) = open.take() {
                        log::warn!("Discarding unterminated plan block for '{}'", unterminated);
                    }
                    open = Some((name, String::new()));
                }
                Token::Text(chunk) => {
                    if let Some((_, body)) = open.as_mut() {
                        body.push_str(chunk);
                    }
                }
                Token::EndAgent => match open.take() {
                    Some((name, body)) => plan.push(name, &body),
                    None => log::debug!("Ignoring {} without an open block", END_AGENT),
                },
                Token::BeginPlanning | Token::EndPlanning => {}
            }
        }

        if let Some((unterminated, _)) = open {
            log::warn!("Discarding unterminated plan block for '{}'", unterminated);
        }

        log::debug!("Parsed planning: {:?}", plan.assignments);
        plan
    }

    fn push(&mut self, name: &str, body: &str) {
        let name = name.trim();
        if name.is_empty() {
            log::warn!("Skipping plan block without an agent name");
            return;
        }

        let tasks = body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string);

        match self.assignments.iter_mut().find(|a| a.agent == name) {
            Some(existing) => existing.tasks.extend(tasks),
            None => self.assignments.push(Assignment {
                agent: name.to_string(),
                tasks: tasks.collect(),
            }),
        }
    }

    pub fn tasks_for(&self, agent: &str) -> Option<&[String]> {
        self.assignments
            .iter()
            .find(|a| a.agent == agent)
            .map(|a| a.tasks.as_slice())
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c.is_whitespace()
}

/// Match `[BEG_AGENT <ws> : <name chars>]` at the start of `input`.
///
/// Returns the raw name and the header length in bytes.
fn agent_header(input: &str) -> Option<(&str, usize)> {
    let rest = input.strip_prefix(BEG_AGENT)?;
    let after_ws = rest.trim_start();
    let after_colon = after_ws.strip_prefix(':')?;

    let name_len = after_colon
        .char_indices()
        .find(|&(_, c)| !is_name_char(c))
        .map_or(after_colon.len(), |(i, _)| i);
    if name_len == 0 || !after_colon[name_len..].starts_with(']') {
        return None;
    }

    let consumed = input.len() - after_colon.len() + name_len + 1;
    Some((&after_colon[..name_len], consumed))
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('[') {
        let at = pos + offset;
        let rest = &text[at..];

        let marker = if rest.starts_with(BEG_PLANNING) {
            Some((Token::BeginPlanning, BEG_PLANNING.len()))
        } else if rest.starts_with(END_PLANNING) {
            Some((Token::EndPlanning, END_PLANNING.len()))
        } else if rest.starts_with(END_AGENT) {
            Some((Token::EndAgent, END_AGENT.len()))
        } else {
            agent_header(rest).map(|(name, len)| (Token::BeginAgent(name), len))
        };

        match marker {
            Some((token, len)) => {
                if text_start < at {
                    tokens.push(Token::Text(&text[text_start..at]));
                }
                tokens.push(token);
                pos = at + len;
                text_start = pos;
            }
            None => pos = at + 1,
        }
    }

    if text_start < text.len() {
        tokens.push(Token::Text(&text[text_start..]));
    }

    tokens
}
