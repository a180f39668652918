//! Currency display and Spanish cardinal words for contract amounts.
//!
//! Amounts are non-negative integers in the smallest currency unit (pesos).
//!
//! # Cardinal words
//!
//! `number_to_words` decomposes a number into magnitude bands and converts
//! each band on its own:
//!
//! - 1–9: plain units
//! - 10–19: irregular forms (`once`, `doce`, ..., `diecinueve`)
//! - 20–29: fused forms (`veintiuno`, `veintidós`, ...)
//! - 30–99: tens joined to units with `y` (`treinta y uno`)
//! - 100–999: `cien` only for exactly 100, otherwise `ciento`, `doscientos`, ...
//! - thousands: `mil` alone for a count of one, `N mil` otherwise
//! - millions: `un millón` / `N millones`
//! - billions (10^12): `un billón` / `N billones`
//!
//! A nonzero remainder below a band is converted recursively and appended
//! after a space. A count in front of `mil`, `millón` or `billón` takes the
//! apocopated form (`veintiún mil`, `ciento un millones`).

const CURRENCY_SYMBOL: &str = "$";
const THOUSANDS_SEPARATOR: char = '.';
const CURRENCY_NAME_SINGULAR: &str = "PESO";
const CURRENCY_NAME_PLURAL: &str = "PESOS";
const LEGAL_TENDER_SUFFIX: &str = "M/CTE";

const THOUSAND: u64 = 1_000;
const MILLION: u64 = 1_000_000;
const BILLION: u64 = 1_000_000_000_000;

const UNITS: [&str; 10] = [
    "", "uno", "dos", "tres", "cuatro", "cinco", "seis", "siete", "ocho", "nueve",
];

const TEENS: [&str; 10] = [
    "diez",
    "once",
    "doce",
    "trece",
    "catorce",
    "quince",
    "dieciséis",
    "diecisiete",
    "dieciocho",
    "diecinueve",
];

const TWENTIES: [&str; 10] = [
    "veinte",
    "veintiuno",
    "veintidós",
    "veintitrés",
    "veinticuatro",
    "veinticinco",
    "veintiséis",
    "veintisiete",
    "veintiocho",
    "veintinueve",
];

const TENS: [&str; 10] = [
    "", "", "", "treinta", "cuarenta", "cincuenta", "sesenta", "setenta", "ochenta", "noventa",
];

const HUNDREDS: [&str; 10] = [
    "",
    "ciento",
    "doscientos",
    "trescientos",
    "cuatrocientos",
    "quinientos",
    "seiscientos",
    "setecientos",
    "ochocientos",
    "novecientos",
];

/// Render an amount as grouped currency text: `$1.500.000`.
///
/// An absent amount renders as `$0`.
pub fn format_currency(amount: Option<u64>) -> String {
    format!("{CURRENCY_SYMBOL}{}", group_thousands(amount.unwrap_or(0)))
}

/// Insert a thousands separator every three digits from the right.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(THOUSANDS_SEPARATOR);
        }
        out.push(ch);
    }
    out
}

/// Full Spanish cardinal words for `n`, lower case.
pub fn number_to_words(n: u64) -> String {
    if n == 0 {
        return "cero".to_string();
    }
    words(n)
}

/// Cardinal words in the form used in front of a masculine noun:
/// `un`, `veintiún`, `treinta y un` instead of `uno`, `veintiuno`, ...
pub fn apocopated_words(n: u64) -> String {
    if n == 0 {
        return "cero".to_string();
    }
    apocope(words(n))
}

/// Upper-case legal amount: `UN MILLÓN DE PESOS M/CTE`.
///
/// `DE` is inserted when the amount is an exact multiple of a million.
pub fn currency_in_words(amount: u64) -> String {
    let count = apocopated_words(amount).to_uppercase();
    let noun = if amount == 1 {
        CURRENCY_NAME_SINGULAR
    } else {
        CURRENCY_NAME_PLURAL
    };
    if amount >= MILLION && amount % MILLION == 0 {
        format!("{count} DE {noun} {LEGAL_TENDER_SUFFIX}")
    } else {
        format!("{count} {noun} {LEGAL_TENDER_SUFFIX}")
    }
}

/// Words followed by figures, the way contract clauses state a value:
/// `CINCO MILLONES DE PESOS M/CTE ($5.000.000)`.
pub fn format_amount_legal(amount: u64) -> String {
    format!(
        "{} ({})",
        currency_in_words(amount),
        format_currency(Some(amount))
    )
}

fn words(n: u64) -> String {
    match n {
        0 => String::new(),
        1..=9 => UNITS[n as usize].to_string(),
        10..=19 => TEENS[(n - 10) as usize].to_string(),
        20..=29 => TWENTIES[(n - 20) as usize].to_string(),
        30..=99 => {
            let (tens, units) = (n / 10, n % 10);
            if units == 0 {
                TENS[tens as usize].to_string()
            } else {
                format!("{} y {}", TENS[tens as usize], UNITS[units as usize])
            }
        }
        100 => "cien".to_string(),
        101..=999 => with_remainder(HUNDREDS[(n / 100) as usize].to_string(), n % 100),
        n if n < MILLION => {
            let count = n / THOUSAND;
            let head = if count == 1 {
                "mil".to_string()
            } else {
                format!("{} mil", apocope(words(count)))
            };
            with_remainder(head, n % THOUSAND)
        }
        n if n < BILLION => {
            let count = n / MILLION;
            let head = if count == 1 {
                "un millón".to_string()
            } else {
                format!("{} millones", apocope(words(count)))
            };
            with_remainder(head, n % MILLION)
        }
        n => {
            let count = n / BILLION;
            let head = if count == 1 {
                "un billón".to_string()
            } else {
                format!("{} billones", apocope(words(count)))
            };
            with_remainder(head, n % BILLION)
        }
    }
}

fn with_remainder(head: String, rest: u64) -> String {
    if rest == 0 {
        head
    } else {
        format!("{head} {}", words(rest))
    }
}

fn apocope(words: String) -> String {
    if let Some(stem) = words.strip_suffix("veintiuno") {
        format!("{stem}veintiún")
    } else if let Some(stem) = words.strip_suffix("uno") {
        format!("{stem}un")
    } else {
        words
    }
}
