//! Parsing of function-call-like expressions, such as the location strings
//! found in GenBank feature tables.

/// A token of a parsed expression: either a bare atom or a parenthesised
/// group of further tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// A bare word such as `join` or `97999..98793`.
    Atom(String),

    /// The arguments between a pair of parentheses.
    Group(Vec<Token>),
}

/// An error encountered while parsing an expression.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExpressionError {
    /// An opening parenthesis was never closed, or a closing one was never
    /// opened.
    #[error("unbalanced parentheses in expression: {0}")]
    Unbalanced(String),
}

/// Parses a string similar to a function call into a token tree. Whitespace is
/// ignored and commas separate atoms.
///
/// ```
/// use recipes::utils::expression::{parse_function_call, Token};
///
/// let parsed = parse_function_call("complement(join(97999..98793,69611..69724))").unwrap();
/// assert_eq!(
///     parsed,
///     vec![
///         Token::Atom("complement".into()),
///         Token::Group(vec![
///             Token::Atom("join".into()),
///             Token::Group(vec![
///                 Token::Atom("97999..98793".into()),
///                 Token::Atom("69611..69724".into()),
///             ]),
///         ]),
///     ]
/// );
/// ```
pub fn parse_function_call(expr: &str) -> Result<Vec<Token>, ExpressionError> {
    let mut chars = expr.chars();
    let (tokens, closed) = parse_group(&mut chars, expr)?;

    if closed {
        return Err(ExpressionError::Unbalanced(expr.to_string()));
    }

    Ok(tokens)
}

/// Parses tokens until the end of input or a closing parenthesis. Returns
/// whether the group ended with a closing parenthesis.
fn parse_group(
    chars: &mut std::str::Chars<'_>,
    expr: &str,
) -> Result<(Vec<Token>, bool), ExpressionError> {
    let mut tokens = Vec::new();
    let mut atom = String::new();

    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            continue;
        }

        if matches!(c, '(' | ')' | ',') && !atom.is_empty() {
            tokens.push(Token::Atom(std::mem::take(&mut atom)));
        }

        match c {
            '(' => {
                let (group, closed) = parse_group(chars, expr)?;
                if !closed {
                    return Err(ExpressionError::Unbalanced(expr.to_string()));
                }
                tokens.push(Token::Group(group));
            }
            ')' => return Ok((tokens, true)),
            ',' => {}
            _ => atom.push(c),
        }
    }

    if !atom.is_empty() {
        tokens.push(Token::Atom(atom));
    }

    Ok((tokens, false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_atoms() {
        let parsed = parse_function_call("a, b ,c").unwrap();
        assert_eq!(
            parsed,
            vec![
                Token::Atom("a".into()),
                Token::Atom("b".into()),
                Token::Atom("c".into())
            ]
        );
    }

    #[test]
    fn test_unclosed_parenthesis_is_an_error() {
        assert!(matches!(
            parse_function_call("join(1..2,3..4"),
            Err(ExpressionError::Unbalanced(_))
        ));
    }

    #[test]
    fn test_stray_closing_parenthesis_is_an_error() {
        assert!(parse_function_call("1..2)").is_err());
    }
}
