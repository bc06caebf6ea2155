use crate::lexer::{Header, Token, TokenKind, lex};
use spinart_core::{
    geometry::Vec2,
    trajectory::{AbsoluteTrajectory, ArmSample, Trajectory, WaypointTrajectory},
};

/// The two text formats a trajectory file can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Absolute,
    Waypoints,
}

/// One source line's tokens, without the trailing newline
#[derive(Debug, Clone, PartialEq)]
struct Line {
    number: usize,
    tokens: Vec<TokenKind>,
}

impl Line {
    fn is_blank(&self) -> bool {
        self.tokens.is_empty()
    }

    fn is_comment(&self) -> bool {
        matches!(self.tokens.as_slice(), [TokenKind::Comment(_)])
    }

    fn header(&self) -> Option<Header> {
        match self.tokens.first() {
            Some(TokenKind::Header(header)) => Some(*header),
            _ => None,
        }
    }

    /// Numeric value of the token at `index`; NaN when absent or not a number
    fn number(&self, index: usize) -> f64 {
        match self.tokens.get(index) {
            Some(TokenKind::Number(value)) => *value,
            _ => f64::NAN,
        }
    }

    fn word(&self, index: usize) -> Option<&str> {
        match self.tokens.get(index) {
            Some(TokenKind::Word(word)) => Some(word),
            _ => None,
        }
    }
}

fn split_lines<I>(tokens: I) -> Vec<Line>
where
    I: IntoIterator<Item = Token>,
{
    let mut out = Vec::new();
    let mut current = Line {
        number: 1,
        tokens: Vec::new(),
    };
    for token in tokens {
        match token.kind {
            TokenKind::Newline => {
                let next = Line {
                    number: token.line + 1,
                    tokens: Vec::new(),
                };
                out.push(std::mem::replace(&mut current, next));
            }
            kind => current.tokens.push(kind),
        }
    }
    if !current.is_blank() {
        out.push(current);
    }
    out
}

/// Pick the dialect: any section header means absolute frames.
pub fn detect(input: &str) -> Dialect {
    detect_tokens(lex(input))
}

pub fn detect_tokens<I>(tokens: I) -> Dialect
where
    I: IntoIterator<Item = Token>,
{
    let absolute = tokens
        .into_iter()
        .any(|t| matches!(t.kind, TokenKind::Header(_)));
    if absolute {
        Dialect::Absolute
    } else {
        Dialect::Waypoints
    }
}

/// Parse either dialect, detecting which one the text is written in.
pub fn parse(input: &str) -> Trajectory {
    parse_tokens(lex(input))
}

pub fn parse_tokens<I>(tokens: I) -> Trajectory
where
    I: IntoIterator<Item = Token>,
{
    let tokens: Vec<Token> = tokens.into_iter().collect();
    let dialect = detect_tokens(tokens.iter().cloned());
    let lines = split_lines(tokens);
    match dialect {
        Dialect::Absolute => Trajectory::Absolute(absolute_from_lines(&lines)),
        Dialect::Waypoints => Trajectory::Waypoints(waypoints_from_lines(&lines)),
    }
}

pub fn parse_absolute(input: &str) -> AbsoluteTrajectory {
    absolute_from_lines(&split_lines(lex(input)))
}

pub fn parse_waypoints(input: &str) -> WaypointTrajectory {
    waypoints_from_lines(&split_lines(lex(input)))
}

/// `# Canvas` takes the next non-blank line as the rotation speed. Each
/// `# Arm N` marker, or a data line after a blank line, opens a new arm
/// block; arms are numbered in the order their blocks appear.
fn absolute_from_lines(lines: &[Line]) -> AbsoluteTrajectory {
    let mut rotation_speed = None;
    let mut awaiting_speed = false;
    let mut arms: Vec<Vec<ArmSample>> = Vec::new();
    let mut in_block = false;

    for line in lines {
        if line.is_blank() {
            in_block = false;
            awaiting_speed = false;
            continue;
        }
        if line.is_comment() {
            continue;
        }
        match line.header() {
            Some(Header::Canvas) => {
                awaiting_speed = true;
                in_block = false;
                continue;
            }
            Some(Header::Arm(index)) => {
                if index != arms.len() {
                    tracing::debug!(
                        line = line.number,
                        index,
                        position = arms.len(),
                        "arm marker out of sequence, numbering by position"
                    );
                }
                awaiting_speed = false;
                arms.push(Vec::new());
                in_block = true;
                continue;
            }
            None => {}
        }

        if awaiting_speed {
            rotation_speed = Some(line.number(0));
            awaiting_speed = false;
            continue;
        }
        if !in_block {
            arms.push(Vec::new());
            in_block = true;
        }

        let sample = ArmSample {
            angle: line.number(0),
            offset: line.number(1),
            pen_down: line.word(2) == Some("true"),
        };
        if !sample.is_valid() {
            tracing::debug!(line = line.number, "malformed sample kept as a skipped frame");
        }
        if let Some(block) = arms.last_mut() {
            block.push(sample);
        }
    }

    AbsoluteTrajectory::from_arms(rotation_speed, &arms)
}

/// The first non-blank line is the rotation speed; each later line is one
/// `x y` waypoint. Lines without two finite numbers are dropped.
fn waypoints_from_lines(lines: &[Line]) -> WaypointTrajectory {
    let mut content = lines.iter().filter(|l| !l.is_blank() && !l.is_comment());
    let rotation_speed = content.next().map(|line| line.number(0));

    let waypoints = content
        .filter_map(|line| {
            let point = Vec2::new(line.number(0), line.number(1));
            if point.is_finite() {
                Some(point)
            } else {
                tracing::debug!(line = line.number, "skipping malformed waypoint");
                None
            }
        })
        .collect();

    WaypointTrajectory {
        rotation_speed,
        waypoints,
    }
}
