//! Pattern front end: syntax validation, explicit concatenation and
//! shunting-yard conversion to postfix.
//!
//! The surface syntax has literals plus `|`, `*` and `( )`. Every other
//! character is a literal, including `.`; concatenation only ever exists as
//! [`Token::Concat`].

/// A pattern token. `Concat` never comes from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Literal(char),
    Open,
    Close,
    Union,
    Star,
    Concat,
}

impl Token {
    fn from_char(c: char) -> Token {
        match c {
            '(' => Token::Open,
            ')' => Token::Close,
            '|' => Token::Union,
            '*' => Token::Star,
            c => Token::Literal(c),
        }
    }

    /// Binding strength of an operator; 0 for everything else.
    fn precedence(self) -> u8 {
        match self {
            Token::Star => 3,
            Token::Concat => 2,
            Token::Union => 1,
            _ => 0,
        }
    }
}

/// Check a pattern for unbalanced brackets and misplaced operators.
///
/// Returns the zero-based character index of the first offending character.
/// An unmatched opener is reported at the first opener left open.
///
/// The checks are purely structural and a little wider than the compiled
/// syntax: `?` is checked like a postfix operator and `[ ]` must balance, yet
/// [`normalize`] reads all three as literal characters. A pattern that passes
/// here, such as `a?`, compiles to a match of the literal text `"a?"`.
pub fn validate(pattern: &str) -> Result<(), usize> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut stack: Vec<(char, usize)> = Vec::new();

    for (i, &c) in chars.iter().enumerate() {
        let prev = i.checked_sub(1).map(|p| chars[p]);
        let next = chars.get(i + 1).copied();
        match c {
            '(' | '[' => stack.push((c, i)),
            ')' | ']' => {
                let opener = if c == ')' { '(' } else { '[' };
                match stack.last() {
                    Some(&(top, _)) if top == opener => {
                        stack.pop();
                    }
                    _ => return Err(i),
                }
            }
            '*' | '?' => {
                if matches!(prev, None | Some('(' | '|')) {
                    return Err(i);
                }
            }
            '|' => {
                if matches!(prev, None | Some('(' | '|')) || matches!(next, None | Some(')' | '|'))
                {
                    return Err(i);
                }
            }
            _ => {}
        }
    }

    match stack.first() {
        Some(&(_, index)) => Err(index),
        None => Ok(()),
    }
}

/// Tokenize `pattern` and insert a [`Token::Concat`] between every pair of
/// adjacent tokens that are implicitly concatenated.
pub fn normalize(pattern: &str) -> Vec<Token> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::with_capacity(chars.len() * 2);

    for (i, &c) in chars.iter().enumerate() {
        tokens.push(Token::from_char(c));
        if let Some(&next) = chars.get(i + 1) {
            if !matches!(c, '(' | '|') && !matches!(next, ')' | '|' | '*') {
                tokens.push(Token::Concat);
            }
        }
    }

    tokens
}

/// Shunting-yard conversion of normalized infix tokens to postfix.
///
/// Input is assumed well formed: a stray `)` drains the operator stack and a
/// stray `(` is dropped.
pub fn to_postfix(tokens: &[Token]) -> Vec<Token> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut operators: Vec<Token> = Vec::new();

    for &token in tokens {
        match token {
            Token::Literal(_) => output.push(token),
            Token::Open => operators.push(token),
            Token::Close => {
                while let Some(op) = operators.pop() {
                    if op == Token::Open {
                        break;
                    }
                    output.push(op);
                }
            }
            Token::Union | Token::Star | Token::Concat => {
                while let Some(&top) = operators.last() {
                    if top == Token::Open || top.precedence() < token.precedence() {
                        break;
                    }
                    output.push(top);
                    operators.pop();
                }
                operators.push(token);
            }
        }
    }

    output.extend(operators.into_iter().rev().filter(|&op| op != Token::Open));
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Render tokens back to text, `.` standing for concatenation.
    fn render(tokens: &[Token]) -> String {
        tokens
            .iter()
            .map(|t| match t {
                Token::Literal(c) => *c,
                Token::Open => '(',
                Token::Close => ')',
                Token::Union => '|',
                Token::Star => '*',
                Token::Concat => '.',
            })
            .collect()
    }

    fn postfix(pattern: &str) -> String {
        render(&to_postfix(&normalize(pattern)))
    }

    #[test]
    fn test_normalize_inserts_concat() {
        assert_eq!(render(&normalize("ab")), "a.b");
        assert_eq!(render(&normalize("a(b|c)*")), "a.(b|c)*");
        assert_eq!(render(&normalize("(a|b)*abb")), "(a|b)*.a.b.b");
        assert_eq!(render(&normalize("a*b*")), "a*.b*");
        assert_eq!(render(&normalize("")), "");
    }

    #[test]
    fn test_normalize_length() {
        // Three insertion points.
        let tokens = normalize("ab(c)d");
        assert_eq!(tokens.len(), 6 + 3);
    }

    #[test]
    fn test_dot_is_a_literal() {
        let tokens = normalize("a.b");
        assert_eq!(
            tokens,
            vec![
                Token::Literal('a'),
                Token::Concat,
                Token::Literal('.'),
                Token::Concat,
                Token::Literal('b'),
            ]
        );
    }

    #[test]
    fn test_postfix_precedence() {
        assert_eq!(postfix("ab"), "ab.");
        assert_eq!(postfix("a|b"), "ab|");
        assert_eq!(postfix("ab|c"), "ab.c|");
        assert_eq!(postfix("a|bc"), "abc.|");
        assert_eq!(postfix("ab*"), "ab*.");
        assert_eq!(postfix("(ab)*"), "ab.*");
        assert_eq!(postfix("a(b|c)*"), "abc|*.");
        assert_eq!(postfix("(a|b)*abb"), "ab|*a.b.b.");
    }

    #[test]
    fn test_postfix_left_associative() {
        assert_eq!(postfix("a|b|c"), "ab|c|");
        assert_eq!(postfix("abc"), "ab.c.");
    }

    #[test]
    fn test_postfix_tolerates_unbalanced_groups() {
        assert_eq!(postfix("(ab"), "ab.");
        assert_eq!(postfix("ab)"), "ab.");
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        for pattern in ["", "a", "a(b|c)*", "(a|b)*abb", "[ab]", "a?", "((a))"] {
            assert_eq!(validate(pattern), Ok(()), "{pattern:?}");
        }
    }

    #[test]
    fn test_validate_brackets() {
        assert_eq!(validate("(a|b"), Err(0));
        assert_eq!(validate("a)"), Err(1));
        assert_eq!(validate("((a)"), Err(0));
        assert_eq!(validate("a(b[c)"), Err(5));
        assert_eq!(validate("ab]"), Err(2));
    }

    #[test]
    fn test_validate_operators() {
        assert_eq!(validate("|ab"), Err(0));
        assert_eq!(validate("ab|"), Err(2));
        assert_eq!(validate("a||b"), Err(1));
        assert_eq!(validate("(|a)"), Err(1));
        assert_eq!(validate("(a|)"), Err(2));
        assert_eq!(validate("*a"), Err(0));
        assert_eq!(validate("a|*b"), Err(2));
        assert_eq!(validate("(*a)"), Err(1));
        assert_eq!(validate("?"), Err(0));
    }

    #[test]
    fn test_validate_counts_characters_not_bytes() {
        assert_eq!(validate("λ|"), Err(1));
    }
}
