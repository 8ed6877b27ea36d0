//! Reader for the textual form of the IR.
//!
//! The text is a list of labelled blocks, each holding one instruction per
//! line:
//!
//! ```text
//! block0:
//!   %0 = const.8 1
//!   %1 = loadctx.8 gpr 16
//!   %2 = add.8 %0 %1
//!   storectx.8 16 %2
//!   jump block1
//! block1:
//!   exit
//! ```
//!
//! Blocks are laid out in the order their labels appear. Value names only
//! have to be unique, they are renumbered on load. A `;` starts a comment.

mod token;


pub use token::Token;

use std::collections::HashMap;

use log::{debug, trace};
use logos::Logos;
use xlat_backend::fallback::COMPARE_FLAG_VARIANTS;
use xlat_common::ir::{
    BinaryOp, BlockId, F80BinaryOp, F80UnaryOp, FloatOp, IrGraph, NodeId, Op, ValueClass,
};

use crate::message::{Messages, Span};

/// Read a graph from `src`. Any problem is reported as a diagnostic against
/// `file`, and the graph is only returned if there were none.
pub fn parse(src: &str, file: usize) -> Result<IrGraph, Messages> {
    let mut msgs = Messages::new();
    let tokens = lex(&mut msgs, src, file);

    let mut parser = Parser {
        tokens,
        at: 0,
        end: Span::new(file, src.len(), src.len()),
        graph: IrGraph::new(),
        labels: HashMap::new(),
        values: HashMap::new(),
        current: None,
        msgs,
    };

    parser.declare_blocks();
    parser.parse_lines();
    parser.check_blocks();

    if parser.msgs.has_errors() {
        Err(parser.msgs)
    } else {
        debug!(
            "read {} nodes in {} blocks",
            parser.graph.node_count(),
            parser.graph.block_count()
        );
        Ok(parser.graph)
    }
}

fn lex<'src>(msgs: &mut Messages, src: &'src str, file: usize) -> Vec<(Token<'src>, Span)> {
    Token::lexer(src)
        .spanned()
        .map(|(token, range)| {
            let span = Span::new(file, range.start, range.end);
            if token == Token::Error {
                msgs.at(span).parse_invalid_token();
            }

            (token, span)
        })
        .collect()
}

struct Parser<'src> {
    tokens: Vec<(Token<'src>, Span)>,
    at: usize,
    end: Span,

    graph: IrGraph,
    labels: HashMap<&'src str, (BlockId, Span)>,
    values: HashMap<u64, (NodeId, Span)>,
    current: Option<BlockId>,

    msgs: Messages,
}

impl<'src> Parser<'src> {
    /// Create a block for every label up front, so jumps can refer to blocks
    /// further down.
    fn declare_blocks(&mut self) {
        let mut line_start = true;

        for (index, (token, span)) in self.tokens.iter().enumerate() {
            let label = match (token, self.tokens.get(index + 1)) {
                (Token::Word(name), Some((Token::Colon, _))) if line_start => Some(*name),
                _ => None,
            };

            line_start = *token == Token::Newline;

            let Some(name) = label else {
                continue;
            };

            if let Some((_, previous)) = self.labels.get(name) {
                self.msgs.at(*span).parse_redefined_block(name, *previous);
                continue;
            }

            let block = self.graph.add_block();
            self.labels.insert(name, (block, *span));
        }
    }

    fn parse_lines(&mut self) {
        while let Some(token) = self.peek() {
            match token {
                Token::Newline => self.at += 1,

                Token::Word(name) if self.peek_at(1) == Some(Token::Colon) => {
                    let span = self.span();
                    self.at += 2;

                    // Redefined labels keep pointing at their first block.
                    if let Some((block, first)) = self.labels.get(name) {
                        if *first == span {
                            self.current = Some(*block);
                        }
                    }

                    if !self.at_line_end() {
                        self.expected("the end of the line");
                        self.skip_line();
                    }
                }

                _ => {
                    if self.instruction().is_none() {
                        self.skip_line();
                    }
                }
            }
        }
    }

    fn check_blocks(&mut self) {
        let mut labels: Vec<_> = self
            .labels
            .iter()
            .map(|(name, (block, span))| (*block, *name, *span))
            .collect();
        labels.sort_by_key(|(block, ..)| *block);

        for (block, name, span) in labels {
            let terminated = self
                .graph
                .block(block)
                .nodes
                .last()
                .map(|last| self.graph.get(*last).op.is_terminator())
                .unwrap_or(false);

            if !terminated {
                self.msgs.at(span).parse_unterminated_block(name);
            }
        }
    }

    fn instruction(&mut self) -> Option<()> {
        let def = match self.peek() {
            Some(Token::Value(name)) => {
                let span = self.span();
                self.at += 1;
                self.token(Token::Equals)?;
                Some((name, span))
            }

            _ => None,
        };

        let (word, span) = self.word("an instruction")?;
        let (name, size) = match word.split_once('.') {
            Some((name, size)) => match size.parse::<u8>() {
                Ok(size) => (name, Some(size)),
                Err(_) => {
                    self.msgs.at(span).parse_number_too_large(u8::MAX.into());
                    return None;
                }
            },

            None => (word, None),
        };

        let Some(block) = self.current else {
            self.msgs.at(span).parse_outside_block();
            return None;
        };

        let op = self.operation(name, span)?;
        let size = self.size(name, &op, size, span)?;

        if !self.at_line_end() {
            self.expected("the end of the line");
            return None;
        }

        match (op.result(), def) {
            (Some(_), None) => {
                self.msgs.at(span).parse_missing_definition(name);
                return None;
            }

            (None, Some((_, def_span))) => {
                self.msgs.at(def_span).parse_unexpected_definition(name);
                return None;
            }

            _ => {}
        }

        if let Some(last) = self.graph.block(block).nodes.last() {
            if self.graph.get(*last).op.is_terminator() {
                self.msgs.at(span).parse_after_terminator();
                return None;
            }
        }

        if let Some((value, def_span)) = def {
            if let Some((_, previous)) = self.values.get(&value) {
                self.msgs.at(def_span).parse_redefined_value(value, *previous);
                return None;
            }
        }

        let id = self.graph.push(block, op, size);

        if let Some((value, def_span)) = def {
            trace!("%{value} is {id}");
            self.values.insert(value, (id, def_span));
        }

        Some(())
    }

    fn operation(&mut self, name: &str, span: Span) -> Option<Op> {
        let op = match name {
            "const" => Op::Constant(self.number("a constant")?),

            "loadctx" => {
                let class = self.class()?;
                let offset = self.word32("a context offset")?;
                Op::LoadContext { offset, class }
            }

            "storectx" => {
                let offset = self.word32("a context offset")?;
                let value = self.operand()?;
                Op::StoreContext { offset, value }
            }

            "loadflag" => Op::LoadFlag(self.byte("a flag number")?),

            "storeflag" => {
                let flag = self.byte("a flag number")?;
                let value = self.operand()?;
                Op::StoreFlag(flag, value)
            }

            "syscall" => Op::Syscall(self.operands()?),

            "isyscall" => {
                let number = self.number("a syscall number")?;
                let args = self.operands()?;
                Op::InlineSyscall { number, args }
            }

            "jump" => Op::Jump(self.block()?),

            "condjump" => {
                let cond = self.operand()?;
                let then = self.block()?;
                let elze = self.block()?;
                Op::CondJump { cond, then, elze }
            }

            "exit" => Op::Exit,

            "f80ldfcw" => Op::F80LoadFcw(self.operand()?),

            "f80cvtto" => {
                let size = self.byte("a source size")?;
                let value = self.operand()?;
                Op::F80CvtTo { value, size }
            }

            "f80cvt" => Op::F80Cvt(self.operand()?),

            "f80cvtint" => {
                let truncate = self.keyword("trunc");
                let value = self.operand()?;
                Op::F80CvtInt { value, truncate }
            }

            "f80cmp" => {
                let span = self.span();
                let flags = self.byte("a flags variant")?;
                if flags >= COMPARE_FLAG_VARIANTS {
                    let limit = COMPARE_FLAG_VARIANTS - 1;
                    self.msgs.at(span).parse_number_too_large(limit.into());
                    return None;
                }

                let left = self.operand()?;
                let right = self.operand()?;
                Op::F80Cmp { left, right, flags }
            }

            "f80cvttoint" => {
                let size = self.byte("a source size")?;
                let value = self.operand()?;
                Op::F80CvtToInt { value, size }
            }

            "spill" => {
                let slot = self.word32("a spill slot")?;
                let value = self.operand()?;
                Op::SpillRegister { value, slot }
            }

            "fill" => {
                let class = self.class()?;
                let slot = self.word32("a spill slot")?;
                Op::FillRegister { slot, class }
            }

            name => {
                if let Some(op) = BinaryOp::ALL.into_iter().find(|op| op.mnemonic() == name) {
                    let left = self.operand()?;
                    Op::Binary(op, left, self.operand()?)
                } else if let Some(op) = FloatOp::ALL.into_iter().find(|op| op.mnemonic() == name) {
                    let left = self.operand()?;
                    Op::Float(op, left, self.operand()?)
                } else if let Some(op) = F80UnaryOp::ALL
                    .into_iter()
                    .find(|op| op.mnemonic() == name)
                {
                    Op::F80Unary(op, self.operand()?)
                } else if let Some(op) = F80BinaryOp::ALL
                    .into_iter()
                    .find(|op| op.mnemonic() == name)
                {
                    let left = self.operand()?;
                    Op::F80Binary(op, left, self.operand()?)
                } else {
                    self.msgs.at(span).parse_unknown_op(name);
                    return None;
                }
            }
        };

        Some(op)
    }

    fn size(&mut self, name: &str, op: &Op, size: Option<u8>, span: Span) -> Option<u8> {
        if op.is_terminator() {
            return match size {
                None => Some(0),
                Some(size) => {
                    self.msgs.at(span).parse_bad_size(name, Some(size));
                    None
                }
            };
        }

        let Some(size) = size else {
            self.msgs.at(span).parse_bad_size(name, None);
            return None;
        };

        let valid = match op {
            Op::Constant(_) | Op::Binary(..) | Op::LoadFlag(_) | Op::StoreFlag(..) => {
                matches!(size, 1 | 2 | 4 | 8)
            }

            _ => matches!(size, 1 | 2 | 4 | 8 | 16),
        };

        if valid {
            Some(size)
        } else {
            self.msgs.at(span).parse_bad_size(name, Some(size));
            None
        }
    }

    fn operand(&mut self) -> Option<NodeId> {
        let Some(Token::Value(value)) = self.peek() else {
            self.expected("a value");
            return None;
        };

        let span = self.span();
        self.at += 1;

        match self.values.get(&value) {
            Some((id, _)) => Some(*id),
            None => {
                self.msgs.at(span).parse_undefined_value(value);
                None
            }
        }
    }

    fn operands(&mut self) -> Option<Vec<NodeId>> {
        let mut operands = Vec::new();
        while let Some(Token::Value(_)) = self.peek() {
            operands.push(self.operand()?);
        }

        Some(operands)
    }

    fn block(&mut self) -> Option<BlockId> {
        let (name, span) = self.word("a block label")?;

        match self.labels.get(name) {
            Some((block, _)) => Some(*block),
            None => {
                self.msgs.at(span).parse_undefined_block(name);
                None
            }
        }
    }

    fn class(&mut self) -> Option<ValueClass> {
        match self.peek() {
            Some(Token::Word("gpr")) => {
                self.at += 1;
                Some(ValueClass::Integer)
            }

            Some(Token::Word("fpr")) => {
                self.at += 1;
                Some(ValueClass::Float)
            }

            _ => {
                self.expected("'gpr' or 'fpr'");
                None
            }
        }
    }

    fn keyword(&mut self, keyword: &str) -> bool {
        if self.peek() == Some(Token::Word(keyword)) {
            self.at += 1;
            true
        } else {
            false
        }
    }

    fn number(&mut self, what: &str) -> Option<u64> {
        let Some(Token::Number(number)) = self.peek() else {
            self.expected(what);
            return None;
        };

        self.at += 1;
        Some(number)
    }

    fn byte(&mut self, what: &str) -> Option<u8> {
        let span = self.span();
        let number = self.number(what)?;
        match u8::try_from(number) {
            Ok(number) => Some(number),
            Err(_) => {
                self.msgs.at(span).parse_number_too_large(u8::MAX.into());
                None
            }
        }
    }

    fn word32(&mut self, what: &str) -> Option<u32> {
        let span = self.span();
        let number = self.number(what)?;
        match u32::try_from(number) {
            Ok(number) => Some(number),
            Err(_) => {
                self.msgs.at(span).parse_number_too_large(u32::MAX.into());
                None
            }
        }
    }

    fn word(&mut self, what: &str) -> Option<(&'src str, Span)> {
        let Some(Token::Word(word)) = self.peek() else {
            self.expected(what);
            return None;
        };

        let span = self.span();
        self.at += 1;
        Some((word, span))
    }

    fn token(&mut self, token: Token<'src>) -> Option<()> {
        if self.peek() == Some(token) {
            self.at += 1;
            Some(())
        } else {
            self.expected(token.describe());
            None
        }
    }

    fn expected(&mut self, what: &str) {
        // Invalid tokens have been reported while lexing.
        if self.peek() != Some(Token::Error) {
            let span = self.span();
            self.msgs.at(span).parse_expected(what);
        }
    }

    fn skip_line(&mut self) {
        while !self.at_line_end() {
            self.at += 1;
        }
    }

    fn at_line_end(&self) -> bool {
        matches!(self.peek(), None | Some(Token::Newline))
    }

    fn peek(&self) -> Option<Token<'src>> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<Token<'src>> {
        self.tokens.get(self.at + offset).map(|(token, _)| *token)
    }

    fn span(&self) -> Span {
        self.tokens
            .get(self.at)
            .map(|(_, span)| *span)
            .unwrap_or(self.end)
    }
}
