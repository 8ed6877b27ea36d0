use codespan_reporting::diagnostic::{Diagnostic, Label};

use super::{MessageAdder, Span};

const INVALID_TOKEN: &str = "EP00";
const EXPECTED: &str = "EP01";
const UNKNOWN_OP: &str = "EP02";
const BAD_SIZE: &str = "EP03";
const UNDEFINED_VALUE: &str = "EP04";
const UNDEFINED_BLOCK: &str = "EP05";
const REDEFINED_VALUE: &str = "EP06";
const REDEFINED_BLOCK: &str = "EP07";
const MISSING_DEFINITION: &str = "EP08";
const UNEXPECTED_DEFINITION: &str = "EP09";
const OUTSIDE_BLOCK: &str = "EP10";
const NUMBER_TOO_LARGE: &str = "EP11";
const UNTERMINATED_BLOCK: &str = "EP12";
const AFTER_TERMINATOR: &str = "EP13";

impl<'a> MessageAdder<'a> {
    pub fn parse_invalid_token(&mut self) {
        let labels = vec![Label::primary(self.at.file, self.at)];

        self.add(
            Diagnostic::error()
                .with_code(INVALID_TOKEN)
                .with_message("invalid token")
                .with_labels(labels),
        );
    }

    pub fn parse_expected(&mut self, what: &str) {
        let labels =
            vec![Label::primary(self.at.file, self.at).with_message(format!("expected {what}"))];

        self.add(
            Diagnostic::error()
                .with_code(EXPECTED)
                .with_message(format!("expected {what}"))
                .with_labels(labels),
        );
    }

    pub fn parse_unknown_op(&mut self, name: &str) {
        let labels = vec![Label::primary(self.at.file, self.at)];

        self.add(
            Diagnostic::error()
                .with_code(UNKNOWN_OP)
                .with_message(format!("unknown instruction '{name}'"))
                .with_labels(labels),
        );
    }

    pub fn parse_bad_size(&mut self, name: &str, size: Option<u8>) {
        let labels = vec![Label::primary(self.at.file, self.at)];
        let message = match size {
            Some(size) => format!("'{name}' cannot have size {size}"),
            None => format!("'{name}' needs a size"),
        };
        let notes = vec![String::from(
            "sizes are written after the instruction name, as in 'add.8'",
        )];

        self.add(
            Diagnostic::error()
                .with_code(BAD_SIZE)
                .with_message(message)
                .with_labels(labels)
                .with_notes(notes),
        );
    }

    pub fn parse_undefined_value(&mut self, value: u64) {
        let labels = vec![Label::primary(self.at.file, self.at)];

        self.add(
            Diagnostic::error()
                .with_code(UNDEFINED_VALUE)
                .with_message(format!("%{value} is used before it is defined"))
                .with_labels(labels),
        );
    }

    pub fn parse_undefined_block(&mut self, name: &str) {
        let labels = vec![Label::primary(self.at.file, self.at)];

        self.add(
            Diagnostic::error()
                .with_code(UNDEFINED_BLOCK)
                .with_message(format!("no block labelled '{name}'"))
                .with_labels(labels),
        );
    }

    pub fn parse_redefined_value(&mut self, value: u64, previous: Span) {
        let labels = vec![
            Label::primary(self.at.file, self.at),
            Label::secondary(previous.file, previous).with_message("first defined here"),
        ];

        self.add(
            Diagnostic::error()
                .with_code(REDEFINED_VALUE)
                .with_message(format!("%{value} is defined twice"))
                .with_labels(labels),
        );
    }

    pub fn parse_redefined_block(&mut self, name: &str, previous: Span) {
        let labels = vec![
            Label::primary(self.at.file, self.at),
            Label::secondary(previous.file, previous).with_message("first defined here"),
        ];

        self.add(
            Diagnostic::error()
                .with_code(REDEFINED_BLOCK)
                .with_message(format!("block '{name}' is defined twice"))
                .with_labels(labels),
        );
    }

    pub fn parse_missing_definition(&mut self, name: &str) {
        let labels = vec![Label::primary(self.at.file, self.at)];
        let notes = vec![format!("write it as '%n = {name} ...'")];

        self.add(
            Diagnostic::error()
                .with_code(MISSING_DEFINITION)
                .with_message(format!("the result of '{name}' must be given a name"))
                .with_labels(labels)
                .with_notes(notes),
        );
    }

    pub fn parse_unexpected_definition(&mut self, name: &str) {
        let labels = vec![Label::primary(self.at.file, self.at)];

        self.add(
            Diagnostic::error()
                .with_code(UNEXPECTED_DEFINITION)
                .with_message(format!("'{name}' does not produce a value"))
                .with_labels(labels),
        );
    }

    pub fn parse_outside_block(&mut self) {
        let labels = vec![Label::primary(self.at.file, self.at)];
        let notes = vec![String::from(
            "start a block with a label such as 'block0:'",
        )];

        self.add(
            Diagnostic::error()
                .with_code(OUTSIDE_BLOCK)
                .with_message("instruction outside of any block")
                .with_labels(labels)
                .with_notes(notes),
        );
    }

    pub fn parse_number_too_large(&mut self, limit: u64) {
        let labels = vec![Label::primary(self.at.file, self.at)];

        self.add(
            Diagnostic::error()
                .with_code(NUMBER_TOO_LARGE)
                .with_message(format!("number does not fit (the limit is {limit})"))
                .with_labels(labels),
        );
    }

    pub fn parse_unterminated_block(&mut self, name: &str) {
        let labels = vec![Label::primary(self.at.file, self.at)];
        let notes = vec![String::from(
            "every block must end with 'jump', 'condjump' or 'exit'",
        )];

        self.add(
            Diagnostic::error()
                .with_code(UNTERMINATED_BLOCK)
                .with_message(format!("block '{name}' does not end in control flow"))
                .with_labels(labels)
                .with_notes(notes),
        );
    }

    pub fn parse_after_terminator(&mut self) {
        let labels = vec![Label::primary(self.at.file, self.at)];

        self.add(
            Diagnostic::error()
                .with_code(AFTER_TERMINATOR)
                .with_message("instruction after the end of its block")
                .with_labels(labels),
        );
    }
}
