//! Hand-written recursive-descent parser for the strategy grammar (spec
//! §4.2, §9). The spec explicitly does not require reproducing the
//! original grammar bit-for-bit, only an equivalent algebra, so this parser
//! defines its own small textual surface:
//!
//! ```text
//! strategy  := term (';' term)*
//! term      := "empty"
//!            | ident '(' (arg (',' arg)*)? ')'            // Method
//!            | "cond" '(' expr ',' strategy (',' strategy)? ')'
//!            | "select" '(' strategy ',' strategy ')'
//!            | '(' strategy ')'
//! arg       := ident '=' value
//! value     := int | float | 'c' char | '{' strategy '}'  // nested Strat
//! expr      := and_expr ('|' and_expr)*
//! and_expr  := cmp ('&' cmp)*
//! cmp       := '(' expr ')' | ident op number
//! op        := "<=" | ">=" | "!=" | '<' | '>' | '='
//! ```

use crate::condition::{Expr, Op};
use crate::tree::{ParamValue, Params, Strategy};
use crate::Error;

pub fn parse(text: &str) -> Result<Strategy, Error> {
    let mut parser = Parser {
        bytes: text.as_bytes(),
        pos: 0,
    };
    let tree = parser.parse_strategy()?;
    parser.skip_ws();
    if parser.pos != parser.bytes.len() {
        return Err(parser.err("trailing input after strategy"));
    }
    Ok(tree)
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn err(&self, message: impl Into<String>) -> Error {
        Error::Parse {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.bytes.get(self.pos).copied()
    }

    fn expect(&mut self, ch: u8) -> Result<(), Error> {
        self.skip_ws();
        if self.bytes.get(self.pos) == Some(&ch) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.err(format!("expected {:?}", ch as char)))
        }
    }

    fn try_consume(&mut self, ch: u8) -> bool {
        self.skip_ws();
        if self.bytes.get(self.pos) == Some(&ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_ident(&mut self) -> Result<String, Error> {
        self.skip_ws();
        let start = self.pos;
        while self
            .bytes
            .get(self.pos)
            .map(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .unwrap_or(false)
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.err("expected identifier"));
        }
        Ok(String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned())
    }

    fn parse_number(&mut self) -> Result<f64, Error> {
        self.skip_ws();
        let start = self.pos;
        if self.bytes.get(self.pos) == Some(&b'-') {
            self.pos += 1;
        }
        while self
            .bytes
            .get(self.pos)
            .map(|b| b.is_ascii_digit() || *b == b'.')
            .unwrap_or(false)
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.err("expected number"));
        }
        std::str::from_utf8(&self.bytes[start..self.pos])
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or_else(|| self.err("invalid numeric literal"))
    }

    fn parse_strategy(&mut self) -> Result<Strategy, Error> {
        let mut node = self.parse_term()?;
        while self.try_consume(b';') {
            let next = self.parse_term()?;
            node = Strategy::Concat(Box::new(node), Box::new(next));
        }
        Ok(node)
    }

    fn parse_term(&mut self) -> Result<Strategy, Error> {
        self.skip_ws();
        if self.try_consume(b'(') {
            let inner = self.parse_strategy()?;
            self.expect(b')')?;
            return Ok(inner);
        }

        let ident = self.parse_ident()?;
        match ident.as_str() {
            "empty" => Ok(Strategy::Empty),
            "cond" => {
                self.expect(b'(')?;
                let test = self.parse_expr()?;
                self.expect(b',')?;
                let then_branch = self.parse_strategy()?;
                let else_branch = if self.try_consume(b',') {
                    Some(Box::new(self.parse_strategy()?))
                } else {
                    None
                };
                self.expect(b')')?;
                Ok(Strategy::Cond {
                    test,
                    then_branch: Box::new(then_branch),
                    else_branch,
                })
            }
            "select" => {
                self.expect(b'(')?;
                let first = self.parse_strategy()?;
                self.expect(b',')?;
                let second = self.parse_strategy()?;
                self.expect(b')')?;
                Ok(Strategy::Select(Box::new(first), Box::new(second)))
            }
            name => {
                let mut params = Params::new();
                if self.try_consume(b'(') {
                    if !self.try_consume(b')') {
                        loop {
                            let key = self.parse_ident()?;
                            self.expect(b'=')?;
                            let value = self.parse_value()?;
                            params.insert(key, value);
                            if !self.try_consume(b',') {
                                break;
                            }
                        }
                        self.expect(b')')?;
                    }
                }
                Ok(Strategy::method(name, params))
            }
        }
    }

    fn parse_value(&mut self) -> Result<ParamValue, Error> {
        self.skip_ws();
        match self.peek() {
            Some(b'{') => {
                self.pos += 1;
                let inner = self.parse_strategy()?;
                self.expect(b'}')?;
                Ok(ParamValue::Strat(Box::new(inner)))
            }
            Some(b'\'') => {
                self.pos += 1;
                let ch = *self
                    .bytes
                    .get(self.pos)
                    .ok_or_else(|| self.err("expected character literal"))?;
                self.pos += 1;
                self.expect(b'\'')?;
                Ok(ParamValue::Case(ch as char))
            }
            _ => {
                let n = self.parse_number()?;
                if n.fract() == 0.0 {
                    Ok(ParamValue::Int(n as i64))
                } else {
                    Ok(ParamValue::Double(n))
                }
            }
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, Error> {
        let mut node = self.parse_and()?;
        while self.try_consume(b'|') {
            let rhs = self.parse_and()?;
            node = Expr::Or(Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn parse_and(&mut self) -> Result<Expr, Error> {
        let mut node = self.parse_cmp()?;
        while self.try_consume(b'&') {
            let rhs = self.parse_cmp()?;
            node = Expr::And(Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    fn parse_cmp(&mut self) -> Result<Expr, Error> {
        if self.try_consume(b'(') {
            let inner = self.parse_expr()?;
            self.expect(b')')?;
            return Ok(inner);
        }
        let feature = self.parse_ident()?;
        let op = self.parse_op()?;
        let value = self.parse_number()?;
        Ok(Expr::Cmp { feature, op, value })
    }

    fn parse_op(&mut self) -> Result<Op, Error> {
        self.skip_ws();
        for (text, op) in [
            ("<=", Op::Le),
            (">=", Op::Ge),
            ("!=", Op::Ne),
            ("<", Op::Lt),
            (">", Op::Gt),
            ("=", Op::Eq),
        ] {
            if self.bytes[self.pos..].starts_with(text.as_bytes()) {
                self.pos += text.len();
                return Ok(op);
            }
        }
        Err(self.err("expected comparison operator"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_empty() {
        assert!(matches!(parse("empty").unwrap(), Strategy::Empty));
    }

    #[test]
    fn parses_method_with_params() {
        let tree = parse("heavy_edge(ratio=0.7,min=4)").unwrap();
        match tree {
            Strategy::Method { name, params } => {
                assert_eq!(name, "heavy_edge");
                assert!(matches!(params.get("min"), Some(ParamValue::Int(4))));
            }
            _ => panic!("expected method"),
        }
    }

    #[test]
    fn parses_concat_sequence() {
        let tree = parse("a();b();c()").unwrap();
        match tree {
            Strategy::Concat(l, r) => {
                assert!(matches!(*r, Strategy::Method { .. }));
                match *l {
                    Strategy::Concat(_, _) => {}
                    _ => panic!("expected left-nested concat"),
                }
            }
            _ => panic!("expected concat"),
        }
    }

    #[test]
    fn parses_cond_with_else() {
        let tree = parse("cond(vert_count>100,multilevel(),recursive_bisection())").unwrap();
        match tree {
            Strategy::Cond {
                test,
                else_branch,
                ..
            } => {
                assert!(matches!(test, Expr::Cmp { op: Op::Gt, .. }));
                assert!(else_branch.is_some());
            }
            _ => panic!("expected cond"),
        }
    }

    #[test]
    fn parses_nested_strat_param() {
        let tree = parse("recursive_bisection(method={multilevel()})").unwrap();
        match tree {
            Strategy::Method { params, .. } => {
                assert!(matches!(params.get("method"), Some(ParamValue::Strat(_))));
            }
            _ => panic!("expected method"),
        }
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(parse("empty)").is_err());
    }
}
