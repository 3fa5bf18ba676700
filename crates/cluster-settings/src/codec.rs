//! Text codecs for duration and byte-size settings
//!
//! Durations use the `1h2m3.5s` notation (units `ns`, `us`/`µs`, `ms`, `s`,
//! `m`, `h`). Byte sizes accept SI and IEC suffixes and render in IEC units.

use std::fmt::Write;
use std::time::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;
const NANOS_PER_MIN: u128 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MIN;

/// Fraction digits beyond this are ignored (keeps the arithmetic in u128)
const MAX_FRACTION_DIGITS: usize = 18;

const BYTE_UNITS: &[(&str, u64)] = &[
	("b", 1),
	("k", 1_000),
	("kb", 1_000),
	("ki", 1 << 10),
	("kib", 1 << 10),
	("m", 1_000_000),
	("mb", 1_000_000),
	("mi", 1 << 20),
	("mib", 1 << 20),
	("g", 1_000_000_000),
	("gb", 1_000_000_000),
	("gi", 1 << 30),
	("gib", 1 << 30),
	("t", 1_000_000_000_000),
	("tb", 1_000_000_000_000),
	("ti", 1 << 40),
	("tib", 1 << 40),
	("p", 1_000_000_000_000_000),
	("pb", 1_000_000_000_000_000),
	("pi", 1 << 50),
	("pib", 1 << 50),
	("e", 1_000_000_000_000_000_000),
	("eb", 1_000_000_000_000_000_000),
	("ei", 1 << 60),
	("eib", 1 << 60),
];

const IEC_SUFFIXES: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

/// Length of the leading `[0-9.]*` run
fn number_prefix_len(s: &str) -> usize {
	s.find(|c: char| !(c.is_ascii_digit() || c == '.')).unwrap_or(s.len())
}

/// Multiply a decimal literal (`12`, `1.5`, `.25`) by `unit`, truncating
/// whatever falls below one unit of the result.
fn scale_decimal(number: &str, unit: u128) -> Result<u128, String> {
	let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
	if whole.is_empty() && frac.is_empty() {
		return Err(format!("invalid number {:?}", number));
	}
	if frac.contains('.') {
		return Err(format!("invalid number {:?}", number));
	}

	let whole: u128 = if whole.is_empty() {
		0
	} else {
		whole.parse().map_err(|_| format!("invalid number {:?}", number))?
	};
	let mut value =
		whole.checked_mul(unit).ok_or_else(|| format!("number {:?} is too large", number))?;

	if !frac.is_empty() {
		let digits = &frac[..frac.len().min(MAX_FRACTION_DIGITS)];
		let frac: u128 = digits.parse().map_err(|_| format!("invalid number {:?}", number))?;
		let scale = 10u128.pow(digits.len() as u32);
		value = value
			.checked_add(frac * unit / scale)
			.ok_or_else(|| format!("number {:?} is too large", number))?;
	}
	Ok(value)
}

/// Parse a duration such as `1h30m`, `250ms` or `1.5s`
pub fn parse_duration(input: &str) -> Result<Duration, String> {
	let s = input.trim();
	if s.is_empty() {
		return Err("empty duration".into());
	}
	if s.starts_with('-') {
		return Err(format!("duration {:?} is negative", input));
	}
	let s = s.strip_prefix('+').unwrap_or(s);
	if s == "0" {
		return Ok(Duration::ZERO);
	}

	let mut total: u128 = 0;
	let mut rest = s;
	while !rest.is_empty() {
		let num_len = number_prefix_len(rest);
		if num_len == 0 {
			return Err(format!("expected a number in duration {:?}", input));
		}
		let (number, tail) = rest.split_at(num_len);

		let unit_len = tail.find(|c: char| c.is_ascii_digit() || c == '.').unwrap_or(tail.len());
		if unit_len == 0 {
			return Err(format!("missing unit in duration {:?}", input));
		}
		let (unit, tail) = tail.split_at(unit_len);
		let unit_nanos = match unit {
			"ns" => 1,
			"us" | "µs" | "μs" => NANOS_PER_MICRO,
			"ms" => NANOS_PER_MILLI,
			"s" => NANOS_PER_SEC,
			"m" => NANOS_PER_MIN,
			"h" => NANOS_PER_HOUR,
			other => return Err(format!("unknown unit {:?} in duration {:?}", other, input)),
		};

		total = total
			.checked_add(scale_decimal(number, unit_nanos)?)
			.ok_or_else(|| format!("duration {:?} is out of range", input))?;
		rest = tail;
	}

	let nanos = u64::try_from(total).map_err(|_| format!("duration {:?} is out of range", input))?;
	Ok(Duration::from_nanos(nanos))
}

/// `value / unit` as a decimal without trailing zeros
fn decimal(value: u128, unit: u128) -> String {
	let whole = value / unit;
	let frac = value % unit;
	if frac == 0 {
		return whole.to_string();
	}
	let width = unit.ilog10() as usize;
	let digits = format!("{:0width$}", frac, width = width);
	format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Render a duration in canonical form (`0s`, `750ms`, `1h0m0s`, `2m3.5s`)
pub fn format_duration(d: Duration) -> String {
	let nanos = d.as_nanos();
	if nanos == 0 {
		return "0s".into();
	}
	if nanos < NANOS_PER_MICRO {
		return format!("{}ns", nanos);
	}
	if nanos < NANOS_PER_MILLI {
		return format!("{}µs", decimal(nanos, NANOS_PER_MICRO));
	}
	if nanos < NANOS_PER_SEC {
		return format!("{}ms", decimal(nanos, NANOS_PER_MILLI));
	}

	let hours = nanos / NANOS_PER_HOUR;
	let minutes = (nanos % NANOS_PER_HOUR) / NANOS_PER_MIN;
	let rest = nanos % NANOS_PER_MIN;

	let mut out = String::new();
	if hours > 0 {
		let _ = write!(out, "{}h", hours);
	}
	if hours > 0 || minutes > 0 {
		let _ = write!(out, "{}m", minutes);
	}
	let _ = write!(out, "{}s", decimal(rest, NANOS_PER_SEC));
	out
}

/// Parse a byte size such as `32MiB`, `64 MB`, `1.5GiB` or `4096`
pub fn parse_bytes(input: &str) -> Result<u64, String> {
	let s = input.trim();
	let num_len = number_prefix_len(s);
	if num_len == 0 {
		return Err(format!("expected a non-negative number in byte size {:?}", input));
	}
	let (number, unit) = s.split_at(num_len);
	let unit = unit.trim().to_ascii_lowercase();

	let multiplier = if unit.is_empty() {
		1
	} else {
		BYTE_UNITS
			.iter()
			.find(|(name, _)| *name == unit)
			.map(|(_, mult)| *mult)
			.ok_or_else(|| format!("unknown unit {:?} in byte size {:?}", unit, input))?
	};

	let bytes = scale_decimal(number, u128::from(multiplier))?;
	u64::try_from(bytes).map_err(|_| format!("byte size {:?} is out of range", input))
}

/// Render a byte size in IEC units (`512 B`, `1.5 KiB`, `32 MiB`)
pub fn format_bytes(bytes: u64) -> String {
	if bytes < 1024 {
		return format!("{} B", bytes);
	}

	let mut exp = 0;
	let mut div: u64 = 1;
	while exp < IEC_SUFFIXES.len() - 1 && bytes / div >= 1024 {
		div *= 1024;
		exp += 1;
	}

	let val = ((bytes as f64 / div as f64) * 10.0 + 0.5).floor() / 10.0;
	if val < 10.0 {
		format!("{:.1} {}", val, IEC_SUFFIXES[exp])
	} else {
		format!("{:.0} {}", val, IEC_SUFFIXES[exp])
	}
}


// vim: ts=4
