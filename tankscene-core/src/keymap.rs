/// Keymap file parser
///
/// One binding per line, `<key> = <action>`. `#` starts a comment, blank
/// lines are ignored:
///
/// ```text
/// # fire with f instead of z
/// f     = fire
/// space = wireframe
/// ```
use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, satisfy, space0},
    combinator::{all_consuming, opt, recognize, rest},
    sequence::{delimited, preceded, separated_pair, terminated},
    IResult,
};

use crate::error::{Error, Result};
use crate::input::{Action, Key};

/// Parse a keymap document into bindings, in file order
pub fn parse_keymap(input: &str) -> Result<Vec<(Key, Action)>> {
    let mut bindings = Vec::new();

    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let (_, parsed) = all_consuming(parse_line)(line).map_err(|e| Error::KeymapSyntax {
            line: line_no,
            reason: describe(e),
        })?;

        if let Some((key, action)) = parsed {
            let key = Key::from_name(key)?;
            let action = Action::from_name(action)?;
            bindings.push((key, action));
        }
    }

    Ok(bindings)
}

fn describe(err: nom::Err<nom::error::Error<&str>>) -> String {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) if e.input.is_empty() => {
            "unexpected end of line".to_string()
        }
        nom::Err::Error(e) | nom::Err::Failure(e) => format!("unexpected input `{}`", e.input.trim()),
        nom::Err::Incomplete(_) => "incomplete input".to_string(),
    }
}

/// A binding, or nothing for blank and comment-only lines
fn parse_line(input: &str) -> IResult<&str, Option<(&str, &str)>> {
    delimited(space0, opt(parse_binding), terminated(space0, opt(comment)))(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
    preceded(char('#'), rest)(input)
}

fn parse_binding(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(key_token, delimited(space0, char('='), space0), action_token)(input)
}

/// A word such as `space`, or any single printable character except `=`/`#`
fn key_token(input: &str) -> IResult<&str, &str> {
    alt((
        take_while1(|c: char| c.is_ascii_alphanumeric()),
        recognize(satisfy(|c| !c.is_whitespace() && c != '=' && c != '#')),
    ))(input)
}

fn action_token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-')(input)
}
