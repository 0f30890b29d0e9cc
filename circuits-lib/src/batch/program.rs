//! # Batch Program Generator
//!
//! Emits the ZoKrates source that validates a batch of `N` headers. The
//! program is assembled as an ordered list of [`Statement`]s and rendered in
//! one pass, so the output only depends on `N`.
//!
//! The generated `main` takes, in order:
//!
//! * `epoch_head_time_and_bits` - word 4 of the epoch head
//! * `prev_hash` - previous hash of the first header
//! * `intermediate_blocks` - `N - 1` SHA-padded headers, private
//! * `final_block` - the last header in five 128-bit chunks
//!
//! and returns the final block hash and the updated target.

use std::fmt;

use tracing::debug;

use super::{
    BatchLayout, BITS_WORD_INDEX, EPOCH_HEAD_WORD_INDEX, FINAL_HEADER_CHUNKS,
    INTERMEDIATE_HEADER_WORDS, SHA_WORD_SIZE, TIME_WORD_INDEX,
};
use crate::common::{
    constants::{HEADER_SIZE, HEADER_WORD_SIZE},
    errors::CircuitInputError,
    padding::{pad_bytes, to_u32_words},
};

const STDLIB_IMPORTS: [(&str, &str); 4] = [
    ("utils/pack/u32/pack256.zok", "pack256"),
    ("utils/pack/u32/nonStrictUnpack256.zok", "unpack256"),
    ("utils/pack/u32/pack128.zok", "pack128"),
    ("utils/pack/u32/unpack128.zok", "unpack128"),
];

const RELAY_IMPORTS: [(&str, &str); 3] = [
    ("./libs/update_target.zok", "update_target"),
    ("./libs/to_big_endian256.zok", "to_big_endian256"),
    ("./libs/validate_block_header.zok", "validate_block_header"),
];

/// File name the program for `batch_size` headers is stored under.
pub fn program_file_name(batch_size: usize) -> String {
    format!("validate_batch{batch_size}.zok")
}

/// Generated program text for one batch size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchProgram {
    batch_size: usize,
    text: String,
}

impl BatchProgram {
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn file_name(&self) -> String {
        program_file_name(self.batch_size)
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for BatchProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Generates the validation program for a batch of `batch_size` headers.
///
/// Fails with a range error when `batch_size < 2`.
pub fn generate(batch_size: usize) -> Result<BatchProgram, CircuitInputError> {
    let layout = BatchLayout::new(batch_size)?;
    let padding = padding_literal()?;

    // Offsets of time and bits inside the unpacked epoch head word.
    let word_offset = EPOCH_HEAD_WORD_INDEX * HEADER_WORD_SIZE / SHA_WORD_SIZE;
    let head_time = TIME_WORD_INDEX - word_offset;
    let head_bits = BITS_WORD_INDEX - word_offset;

    let mut final_block = (0..FINAL_HEADER_CHUNKS)
        .map(|i| format!("...unpack128(final_block[{i}])"))
        .collect::<Vec<_>>();
    final_block.push(padding);

    let mut builder = ProgramBuilder::default();
    for (path, alias) in STDLIB_IMPORTS {
        builder.import(path, alias);
    }
    builder.blank();
    for (path, alias) in RELAY_IMPORTS {
        builder.import(path, alias);
    }
    builder
        .blank()
        .function(format!(
            "def main(field epoch_head_time_and_bits, field prev_hash, private u32[{}][{INTERMEDIATE_HEADER_WORDS}] intermediate_blocks, field[{FINAL_HEADER_CHUNKS}] final_block) -> (field, field):",
            layout.intermediate_count()
        ))
        .line("u32[4] tmp = unpack128(epoch_head_time_and_bits)")
        .line(format!("u32 little_head_time = tmp[{head_time}]"))
        .line(format!("u32 little_head_bits = tmp[{head_bits}]"))
        .blank()
        .line("u32[8] big_prev_hash = unpack256(prev_hash)")
        .line("u32[8] little_prev_hash = to_big_endian256(big_prev_hash)")
        .blank()
        .array(
            format!("u32[{INTERMEDIATE_HEADER_WORDS}] little_final_block"),
            final_block,
        )
        .blank()
        .line(format!(
            "u32 little_tail_time = intermediate_blocks[0][{TIME_WORD_INDEX}]"
        ))
        .line(format!(
            "u32 little_next_bits = little_final_block[{BITS_WORD_INDEX}]"
        ))
        .blank()
        .comment("validate intermediate headers");
    for i in 0..layout.intermediate_count() {
        builder.line(format!(
            "little_prev_hash = validate_block_header(little_head_bits, little_prev_hash, intermediate_blocks[{i}])"
        ));
    }
    builder
        .blank()
        .comment("validate final block header")
        .line("u32[8] little_final_hash = validate_block_header(little_next_bits, little_prev_hash, little_final_block)")
        .blank()
        .comment("validate target")
        .line("field big_updated_target = update_target(little_head_time, little_head_bits, little_tail_time)")
        .blank()
        .line("field big_final_hash = pack256(to_big_endian256(little_final_hash))")
        .returns(&["big_final_hash", "big_updated_target"]);

    let text = builder.render();
    debug!(batch_size, len = text.len(), "Generated batch program");

    Ok(BatchProgram { batch_size, text })
}

/// Constant SHA padding words of an 80-byte message, zero runs collapsed
/// into spreads.
fn padding_literal() -> Result<String, CircuitInputError> {
    let words = to_u32_words(&pad_bytes(&[0u8; HEADER_SIZE]))?;

    let mut parts = Vec::new();
    let mut zeros = 0;
    for word in &words[HEADER_SIZE / SHA_WORD_SIZE..] {
        if *word == 0 {
            zeros += 1;
            continue;
        }
        if zeros > 0 {
            parts.push(format!("...[0; {zeros}]"));
            zeros = 0;
        }
        parts.push(word.to_string());
    }
    if zeros > 0 {
        parts.push(format!("...[0; {zeros}]"));
    }
    Ok(parts.join(", "))
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Statement {
    Import { path: String, alias: String },
    Function(String),
    Line(String),
    Comment(String),
    Array { declaration: String, items: Vec<String> },
    Return(Vec<String>),
    Blank,
}

#[derive(Default, Debug)]
struct ProgramBuilder {
    statements: Vec<Statement>,
}

impl ProgramBuilder {
    const INDENT: &'static str = "    ";

    fn import(&mut self, path: &str, alias: &str) -> &mut Self {
        self.push(Statement::Import {
            path: path.to_string(),
            alias: alias.to_string(),
        })
    }

    fn function(&mut self, signature: impl Into<String>) -> &mut Self {
        self.push(Statement::Function(signature.into()))
    }

    fn line(&mut self, line: impl Into<String>) -> &mut Self {
        self.push(Statement::Line(line.into()))
    }

    fn comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.push(Statement::Comment(comment.into()))
    }

    fn array(&mut self, declaration: impl Into<String>, items: Vec<String>) -> &mut Self {
        self.push(Statement::Array {
            declaration: declaration.into(),
            items,
        })
    }

    fn returns(&mut self, values: &[&str]) -> &mut Self {
        self.push(Statement::Return(
            values.iter().map(|value| value.to_string()).collect(),
        ))
    }

    fn blank(&mut self) -> &mut Self {
        self.push(Statement::Blank)
    }

    fn push(&mut self, statement: Statement) -> &mut Self {
        self.statements.push(statement);
        self
    }

    fn render(&self) -> String {
        let indent = Self::INDENT;
        let mut out = String::new();
        for statement in &self.statements {
            match statement {
                Statement::Import { path, alias } => {
                    out.push_str(&format!("import \"{path}\" as {alias}\n"));
                }
                Statement::Function(signature) => {
                    out.push_str(signature);
                    out.push('\n');
                }
                Statement::Line(line) => {
                    out.push_str(&format!("{indent}{line}\n"));
                }
                Statement::Comment(comment) => {
                    out.push_str(&format!("{indent}// {comment}\n"));
                }
                Statement::Array { declaration, items } => {
                    out.push_str(&format!("{indent}{declaration} = [\n"));
                    let separator = format!(",\n{indent}{indent}");
                    out.push_str(&format!("{indent}{indent}{}\n", items.join(&separator)));
                    out.push_str(&format!("{indent}]\n"));
                }
                Statement::Return(values) => {
                    out.push_str(&format!("{indent}return {}\n", values.join(", ")));
                }
                Statement::Blank => out.push('\n'),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::RangeError;

    const BATCH_2_PROGRAM: &str = r#"import "utils/pack/u32/pack256.zok" as pack256
import "utils/pack/u32/nonStrictUnpack256.zok" as unpack256
import "utils/pack/u32/pack128.zok" as pack128
import "utils/pack/u32/unpack128.zok" as unpack128

import "./libs/update_target.zok" as update_target
import "./libs/to_big_endian256.zok" as to_big_endian256
import "./libs/validate_block_header.zok" as validate_block_header

def main(field epoch_head_time_and_bits, field prev_hash, private u32[1][32] intermediate_blocks, field[5] final_block) -> (field, field):
    u32[4] tmp = unpack128(epoch_head_time_and_bits)
    u32 little_head_time = tmp[1]
    u32 little_head_bits = tmp[2]

    u32[8] big_prev_hash = unpack256(prev_hash)
    u32[8] little_prev_hash = to_big_endian256(big_prev_hash)

    u32[32] little_final_block = [
        ...unpack128(final_block[0]),
        ...unpack128(final_block[1]),
        ...unpack128(final_block[2]),
        ...unpack128(final_block[3]),
        ...unpack128(final_block[4]),
        2147483648, ...[0; 10], 640
    ]

    u32 little_tail_time = intermediate_blocks[0][17]
    u32 little_next_bits = little_final_block[18]

    // validate intermediate headers
    little_prev_hash = validate_block_header(little_head_bits, little_prev_hash, intermediate_blocks[0])

    // validate final block header
    u32[8] little_final_hash = validate_block_header(little_next_bits, little_prev_hash, little_final_block)

    // validate target
    field big_updated_target = update_target(little_head_time, little_head_bits, little_tail_time)

    field big_final_hash = pack256(to_big_endian256(little_final_hash))
    return big_final_hash, big_updated_target
"#;

    #[test]
    fn test_generate_batch_2() {
        let program = generate(2).unwrap();
        assert_eq!(program.as_str(), BATCH_2_PROGRAM);
        assert_eq!(program.batch_size(), 2);
        assert_eq!(program.file_name(), "validate_batch2.zok");
    }

    #[test]
    fn test_generate_unrolls_header_checks() {
        let program = generate(6).unwrap();
        let text = program.as_str();

        assert!(text.contains("private u32[5][32] intermediate_blocks"));
        assert_eq!(text.matches("intermediate_blocks[").count(), 6);
        for i in 0..5 {
            assert!(text.contains(&format!(
                "little_prev_hash = validate_block_header(little_head_bits, little_prev_hash, intermediate_blocks[{i}])\n"
            )));
        }
        assert!(!text.contains("intermediate_blocks[5]"));
        assert_eq!(text.matches("update_target(").count(), 1);
    }

    #[test]
    fn test_generate_is_deterministic() {
        for n in [2, 3, 16, 64] {
            assert_eq!(generate(n).unwrap(), generate(n).unwrap());
            assert_eq!(generate(n).unwrap().to_string(), generate(n).unwrap().into_string());
        }
        assert_ne!(generate(2).unwrap(), generate(3).unwrap());
    }

    #[test]
    fn test_generate_rejects_small_batches() {
        for n in [0, 1] {
            assert_eq!(
                generate(n),
                Err(CircuitInputError::Range(RangeError::BatchTooSmall {
                    min: 2,
                    actual: n
                }))
            );
        }
    }

    #[test]
    fn test_padding_literal() {
        assert_eq!(padding_literal().unwrap(), "2147483648, ...[0; 10], 640");
    }
}
