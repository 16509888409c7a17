//! Semicolon statement splitter
//!
//! Splits a SQL script into individual statements without parsing SQL. A
//! small stack of scanning states tracks quotes, escapes and comments so that
//! a `;` inside a string literal or comment does not end a statement.
//!
//! Malformed input never fails: an unterminated quote or comment simply runs
//! to the end of the script and whatever was accumulated becomes the last
//! statement.
//!
//! Nested block comments are not tracked. The first `*/` closes the comment
//! no matter how many `/*` appeared inside it.


/// Scanning mode. The top of the stack decides how the next character is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    /// Saw `-` or `/`; the next character decides whether a comment starts.
    CommentStart(char),
    LineComment,
    MultiComment,
    /// Saw `*` inside a block comment.
    CommentEnd,
    /// The next character is taken literally.
    Escaped,
}

impl State {
    fn is_comment(self) -> bool {
        matches!(
            self,
            State::LineComment | State::MultiComment | State::CommentEnd
        )
    }
}

/// Reusable splitter configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatementSplitter {
    strip_comments: bool,
}

impl StatementSplitter {
    pub fn new(strip_comments: bool) -> Self {
        Self { strip_comments }
    }

    pub fn strip_comments(&self) -> bool {
        self.strip_comments
    }

    /// Split `script` into trimmed statements, without their terminating
    /// semicolons. Blank statements are dropped.
    pub fn split(&self, script: &str) -> Vec<String> {
        let mut scan = Scan::new(self.strip_comments);
        for c in script.chars() {
            scan.step(c);
        }
        scan.finish()
    }
}

/// Shorthand for `StatementSplitter::new(strip_comments).split(script)`.
pub fn parse_statements(script: &str, strip_comments: bool) -> Vec<String> {
    StatementSplitter::new(strip_comments).split(script)
}

struct Scan {
    strip_comments: bool,
    stack: Vec<State>,
    buffer: String,
    statements: Vec<String>,
}

impl Scan {
    fn new(strip_comments: bool) -> Self {
        Self {
            strip_comments,
            stack: vec![State::Normal],
            buffer: String::new(),
            statements: Vec::new(),
        }
    }

    fn top(&self) -> State {
        self.stack.last().copied().unwrap_or(State::Normal)
    }

    fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    fn emit(&mut self, c: char, comment: bool) {
        if !(comment && self.strip_comments) {
            self.buffer.push(c);
        }
    }

    fn flush(&mut self) {
        let statement = self.buffer.trim();
        if !statement.is_empty() {
            self.statements.push(statement.to_string());
        }
        self.buffer.clear();
    }

    fn step(&mut self, c: char) {
        // A tentative comment opener that turns out not to be one hands the
        // character back to the state below it.
        loop {
            match self.top() {
                State::Normal => {
                    match c {
                        ';' => self.flush(),
                        '-' | '/' => self.stack.push(State::CommentStart(c)),
                        '\'' => {
                            self.stack.push(State::SingleQuoted);
                            self.emit(c, false);
                        }
                        '"' => {
                            self.stack.push(State::DoubleQuoted);
                            self.emit(c, false);
                        }
                        '\\' => {
                            self.stack.push(State::Escaped);
                            self.emit(c, false);
                        }
                        _ => self.emit(c, false),
                    }
                    return;
                }
                State::CommentStart(opener) => {
                    self.pop();
                    let comment = match (opener, c) {
                        ('-', '-') => Some(State::LineComment),
                        ('/', '*') => Some(State::MultiComment),
                        _ => None,
                    };
                    match comment {
                        Some(state) => {
                            self.stack.push(state);
                            self.emit(opener, true);
                            self.emit(c, true);
                            return;
                        }
                        None => self.emit(opener, false),
                    }
                }
                State::LineComment => {
                    match c {
                        '\\' => self.stack.push(State::Escaped),
                        '\n' => self.pop(),
                        _ => {}
                    }
                    self.emit(c, true);
                    return;
                }
                State::MultiComment => {
                    match c {
                        '\\' => self.stack.push(State::Escaped),
                        '*' => self.stack.push(State::CommentEnd),
                        _ => {}
                    }
                    self.emit(c, true);
                    return;
                }
                State::CommentEnd => {
                    self.pop();
                    if c == '/' {
                        self.pop();
                        self.emit(c, true);
                        return;
                    }
                }
                State::SingleQuoted | State::DoubleQuoted => {
                    let quote = if self.top() == State::SingleQuoted { '\'' } else { '"' };
                    if c == '\\' {
                        self.stack.push(State::Escaped);
                    } else if c == quote {
                        self.pop();
                    }
                    self.emit(c, false);
                    return;
                }
                State::Escaped => {
                    self.pop();
                    let comment = self.top().is_comment();
                    self.emit(c, comment);
                    return;
                }
            }
        }
    }

    fn finish(mut self) -> Vec<String> {
        if let State::CommentStart(opener) = self.top() {
            self.emit(opener, false);
        }
        self.flush();
        self.statements
    }
}
