//! Brazilian taxpayer numbers (CPF and CNPJ): check digits, validation and
//! generation.

use {
    anyhow::Result,
    async_trait::async_trait,
    rand::Rng,
};

use {
    botplugs_common::{Cmd, Reply},
    botplugs_plugins::Command,
};

const MSG_INVALID_PARAM: &str = "Parâmetro inválido.";
const MSG_INVALID_PARAM_COUNT: &str = "Quantidade de parâmetros inválida.";

/// Shape of one document type.
#[derive(Debug, Clone, Copy)]
pub struct DocumentKind {
    /// Upper-case label used in replies ("CPF").
    pub label: &'static str,
    pub len: usize,
    weight: fn(usize) -> u32,
    help: &'static str,
    usage: &'static str,
}

pub const CPF: DocumentKind = DocumentKind {
    label: "CPF",
    len: 11,
    weight: cpf_weight,
    help: "Gerador/Validador de CPF.",
    usage: "n para gerar n CPF e !cpf 12345678909 para validar um CPF",
};

pub const CNPJ: DocumentKind = DocumentKind {
    label: "CNPJ",
    len: 14,
    weight: cnpj_weight,
    help: "Gerador/Validador de CNPJ.",
    usage: "n para gerar n CNPJ e !cnpj 11111111111 para validar um CNPJ",
};

// Position 0 is the rightmost digit.
fn cpf_weight(position: usize) -> u32 {
    position as u32 + 2
}

fn cnpj_weight(position: usize) -> u32 {
    (position % 8) as u32 + 2
}

impl DocumentKind {
    /// Check digit for `digits`, weighting from the rightmost digit leftwards.
    pub fn check_digit(&self, digits: &[u8]) -> u8 {
        let sum: u32 = digits
            .iter()
            .rev()
            .enumerate()
            .map(|(pos, d)| (self.weight)(pos) * u32::from(*d))
            .sum();
        match (sum * 10) % 11 {
            10 => 0,
            r => r as u8,
        }
    }

    /// Append both check digits to a base of `len - 2` digits.
    pub fn complete(&self, base: &[u8]) -> Vec<u8> {
        let mut doc = base.to_vec();
        doc.push(self.check_digit(&doc));
        doc.push(self.check_digit(&doc));
        doc
    }

    /// Accepts the bare digits or the usual `.`/`-`/`/` formatting.
    pub fn is_valid(&self, input: &str) -> bool {
        let digits: Option<Vec<u8>> = input
            .chars()
            .filter(|c| !matches!(c, '.' | '-' | '/'))
            .map(|c| c.to_digit(10).map(|d| d as u8))
            .collect();
        let Some(digits) = digits else {
            return false;
        };
        if digits.len() != self.len || all_same(&digits) {
            return false;
        }
        let base = &digits[..self.len - 2];
        self.complete(base) == digits
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let base = loop {
            let base: Vec<u8> = (0..self.len - 2).map(|_| rng.random_range(0..10)).collect();
            if !all_same(&base) {
                break base;
            }
        };
        self.complete(&base)
            .iter()
            .map(|d| char::from(b'0' + d))
            .collect()
    }
}

fn all_same(digits: &[u8]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

/// `!cpf` / `!cnpj`: generate `n` numbers, or validate one.
pub struct DocumentCommand {
    kind: DocumentKind,
    name: String,
}

impl DocumentCommand {
    pub fn new(kind: DocumentKind) -> Self {
        Self {
            kind,
            name: kind.label.to_lowercase(),
        }
    }

    fn respond(&self, args: &[String]) -> String {
        let param = match args {
            [] => "1",
            [param] => param.as_str(),
            _ => return MSG_INVALID_PARAM_COUNT.into(),
        };

        if param.len() > 2 {
            let verdict = if self.kind.is_valid(param) {
                "válido"
            } else {
                "inválido"
            };
            return format!("{} {param} é {verdict}.", self.kind.label);
        }

        let Ok(count) = param.parse::<u8>() else {
            return MSG_INVALID_PARAM.into();
        };
        let mut rng = rand::rng();
        (0..count)
            .map(|_| self.kind.generate(&mut rng))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl Command for DocumentCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn help(&self) -> &str {
        self.kind.help
    }

    fn usage(&self) -> &str {
        self.kind.usage
    }

    async fn execute(&self, cmd: &Cmd) -> Result<Reply> {
        Ok(Reply::text(self.respond(&cmd.args)))
    }
}
