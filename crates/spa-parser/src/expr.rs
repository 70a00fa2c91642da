// Infix-to-postfix conversion for pattern expressions.
//
// The canonical form is the postfix token sequence joined by single
// spaces, with one leading and one trailing space. Substring search on
// that form implements sub-expression matching: " x 1 - " occurs in
// " y x 1 - * " exactly when `x - 1` is a sub-expression of `y * (x - 1)`.

use spa_error::{Result, SpaError};

use crate::token::{Token, TokenKind};

/// Left-associative binding power. Higher binds tighter.
fn precedence(op: &str) -> u8 {
    match op {
        "*" | "/" | "%" => 2,
        _ => 1, // "+" | "-"
    }
}

fn is_arith_op(tok: &Token) -> bool {
    tok.kind == TokenKind::Operator && matches!(tok.text.as_str(), "+" | "-" | "*" | "/" | "%")
}

/// Convert an infix arithmetic expression to its canonical postfix
/// string via the shunting-yard algorithm.
///
/// Accepts identifiers, numbers, `+ - * / %`, and parentheses. Anything
/// else, and any malformed shape (adjacent operands, dangling operator,
/// unbalanced parentheses, empty input), is a syntax error.
pub fn infix_to_postfix(tokens: &[Token]) -> Result<String> {
    let mut output: Vec<&str> = Vec::new();
    let mut ops: Vec<&str> = Vec::new();
    // Whether the next token must be an operand (or an opening paren).
    let mut expect_operand = true;

    for tok in tokens {
        match tok.kind {
            TokenKind::Identifier | TokenKind::Number => {
                if !expect_operand {
                    return Err(SpaError::syntax(format!(
                        "Expected an operator in expression but got {tok}"
                    )));
                }
                output.push(&tok.text);
                expect_operand = false;
            }
            TokenKind::Delimiter if tok.text == "(" => {
                if !expect_operand {
                    return Err(SpaError::syntax(
                        "Expected an operator in expression but got (",
                    ));
                }
                ops.push("(");
            }
            TokenKind::Delimiter if tok.text == ")" => {
                if expect_operand {
                    return Err(SpaError::syntax(
                        "Expected an operand in expression but got )",
                    ));
                }
                loop {
                    match ops.pop() {
                        Some("(") => break,
                        Some(op) => output.push(op),
                        None => {
                            return Err(SpaError::syntax(
                                "Unbalanced ) in expression",
                            ));
                        }
                    }
                }
            }
            TokenKind::Operator if is_arith_op(tok) => {
                if expect_operand {
                    return Err(SpaError::syntax(format!(
                        "Expected an operand in expression but got {tok}"
                    )));
                }
                while let Some(&top) = ops.last() {
                    if top != "(" && precedence(top) >= precedence(&tok.text) {
                        output.push(top);
                        ops.pop();
                    } else {
                        break;
                    }
                }
                ops.push(&tok.text);
                expect_operand = true;
            }
            _ => {
                return Err(SpaError::syntax(format!(
                    "Unexpected token in expression: {tok}"
                )));
            }
        }
    }

    if output.is_empty() {
        return Err(SpaError::syntax("Empty expression"));
    }
    if expect_operand {
        return Err(SpaError::syntax("Expression ends with an operator"));
    }
    while let Some(op) = ops.pop() {
        if op == "(" {
            return Err(SpaError::syntax("Unbalanced ( in expression"));
        }
        output.push(op);
    }

    Ok(format!(" {} ", output.join(" ")))
}
