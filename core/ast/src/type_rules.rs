//! Best-effort type synthesis.
//!
//! Every rule here is a pure function from child types (or literal text) to a
//! [`TypeDescription`]. The builder uses the literal and elementary rules while the
//! tree is constructed; the resolver uses the rest once declarations are bound.

use crate::nodes::{
    BinaryOperator, ContractKind, OperatorCategory, StateMutability, StorageLocation,
    TypeDescription, UnaryOperator, Visibility,
};

/// Largest decimal exponent a numeric literal may carry before it is treated as malformed.
const MAX_SCALE: u64 = 4096;

#[must_use]
pub fn unknown() -> TypeDescription {
    TypeDescription::new("unknown", "t_unknown")
}

#[must_use]
pub fn bool_type() -> TypeDescription {
    TypeDescription::new("bool", "t_bool")
}

#[must_use]
pub fn uint256() -> TypeDescription {
    TypeDescription::new("uint256", "t_uint256")
}

#[must_use]
pub fn address(payable: bool) -> TypeDescription {
    if payable {
        TypeDescription::new("address payable", "t_address_payable")
    } else {
        TypeDescription::new("address", "t_address")
    }
}

#[must_use]
pub fn bytes_memory() -> TypeDescription {
    TypeDescription::new("bytes memory", "t_bytes_memory_ptr")
}

#[must_use]
pub fn string_memory() -> TypeDescription {
    TypeDescription::new("string memory", "t_string_memory_ptr")
}

fn fixed_bytes(size: u8) -> TypeDescription {
    TypeDescription::new(format!("bytes{size}"), format!("t_bytes{size}"))
}

/// `$_<id1>_$_<id2>_$`, or `$__$` for an empty list.
#[must_use]
pub fn identifier_segment<'a>(identifiers: impl IntoIterator<Item = &'a str>) -> String {
    let identifiers: Vec<&str> = identifiers.into_iter().collect();
    format!("$_{}_$", identifiers.join("_$_"))
}

fn type_strings(types: &[TypeDescription]) -> String {
    types
        .iter()
        .map(|t| t.type_string.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

#[must_use]
pub fn tuple(components: &[TypeDescription]) -> TypeDescription {
    TypeDescription::new(
        format!("tuple({})", type_strings(components)),
        format!(
            "t_tuple{}",
            identifier_segment(components.iter().map(|t| t.type_identifier.as_str()))
        ),
    )
}

/// Type of a call target synthesized from the types of the call's arguments.
#[must_use]
pub fn callee_signature(arguments: &[TypeDescription]) -> TypeDescription {
    TypeDescription::new(
        format!("function({})", type_strings(arguments)),
        format!(
            "t_function{}",
            identifier_segment(arguments.iter().map(|t| t.type_identifier.as_str()))
        ),
    )
}

#[must_use]
pub fn binary_category(operator: BinaryOperator) -> OperatorCategory {
    match operator {
        BinaryOperator::Add | BinaryOperator::Sub => OperatorCategory::Additive,
        BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Mod => {
            OperatorCategory::Multiplicative
        }
        BinaryOperator::Exp => OperatorCategory::Exponent,
        BinaryOperator::Shl | BinaryOperator::Shr | BinaryOperator::Sar => OperatorCategory::Shift,
        BinaryOperator::BitAnd => OperatorCategory::BitAnd,
        BinaryOperator::BitXor => OperatorCategory::BitXor,
        BinaryOperator::BitOr => OperatorCategory::BitOr,
        BinaryOperator::Lt | BinaryOperator::Gt | BinaryOperator::Le | BinaryOperator::Ge => {
            OperatorCategory::Comparison
        }
        BinaryOperator::Eq | BinaryOperator::Ne => OperatorCategory::Equality,
        BinaryOperator::And => OperatorCategory::And,
        BinaryOperator::Or => OperatorCategory::Or,
    }
}

#[must_use]
pub fn binary(operator: BinaryOperator, left: Option<&TypeDescription>) -> Option<TypeDescription> {
    if binary_category(operator).result_follows_operand() {
        left.cloned()
    } else {
        Some(bool_type())
    }
}

#[must_use]
pub fn unary(operator: UnaryOperator, operand: Option<&TypeDescription>) -> Option<TypeDescription> {
    match operator {
        UnaryOperator::Not => Some(bool_type()),
        UnaryOperator::Delete => Some(tuple(&[])),
        _ => operand.cloned(),
    }
}

/// Canonical spelling of an elementary type keyword (`uint` is `uint256`).
#[must_use]
pub fn canonical_elementary_name(name: &str) -> String {
    match name {
        "uint" => "uint256".to_string(),
        "int" => "int256".to_string(),
        "byte" => "bytes1".to_string(),
        "ufixed" => "ufixed128x18".to_string(),
        "fixed" => "fixed128x18".to_string(),
        other => other.to_string(),
    }
}

#[must_use]
pub fn elementary(name: &str, payable: bool) -> TypeDescription {
    let canonical = canonical_elementary_name(name);
    if canonical == "address" {
        return address(payable);
    }
    TypeDescription::new(canonical.clone(), format!("t_{canonical}"))
}

/// Whether values of this type live behind a data location.
#[must_use]
pub fn is_reference(type_description: &TypeDescription) -> bool {
    let id = type_description.type_identifier.as_str();
    let unlocated = !(id.ends_with("_ptr") || id.ends_with("_storage"));
    unlocated
        && (id == "t_string"
            || id == "t_bytes"
            || id.starts_with("t_array$")
            || id.starts_with("t_struct$")
            || id.starts_with("t_mapping$"))
}

/// Attaches a data location to a reference type; value types pass through.
#[must_use]
pub fn located(
    type_description: &TypeDescription,
    location: StorageLocation,
    state_variable: bool,
) -> TypeDescription {
    if !is_reference(type_description) {
        return type_description.clone();
    }
    let TypeDescription {
        type_string,
        type_identifier,
    } = type_description;
    match location {
        StorageLocation::Memory => TypeDescription::new(
            format!("{type_string} memory"),
            format!("{type_identifier}_memory_ptr"),
        ),
        StorageLocation::Calldata => TypeDescription::new(
            format!("{type_string} calldata"),
            format!("{type_identifier}_calldata_ptr"),
        ),
        StorageLocation::Storage => TypeDescription::new(
            format!("{type_string} storage pointer"),
            format!("{type_identifier}_storage_ptr"),
        ),
        StorageLocation::Default
            if state_variable && !type_identifier.starts_with("t_mapping$") =>
        {
            TypeDescription::new(type_string.clone(), format!("{type_identifier}_storage"))
        }
        StorageLocation::Default => type_description.clone(),
    }
}

fn in_storage(type_description: &TypeDescription) -> TypeDescription {
    located(type_description, StorageLocation::Default, true)
}

#[must_use]
pub fn mapping(key: &TypeDescription, value: &TypeDescription) -> TypeDescription {
    let value = in_storage(value);
    TypeDescription::new(
        format!("mapping({} => {})", key.type_string, value.type_string),
        format!(
            "t_mapping{}",
            identifier_segment([key.type_identifier.as_str(), value.type_identifier.as_str()])
        ),
    )
}

#[must_use]
pub fn array(base: &TypeDescription, length: Option<&str>) -> TypeDescription {
    let base = in_storage(base);
    let (suffix, marker) = match length {
        Some(length) => (format!("[{length}]"), length.to_string()),
        None => ("[]".to_string(), "dyn".to_string()),
    };
    TypeDescription::new(
        format!("{}{suffix}", base.type_string),
        format!("t_array$_{}_${marker}", base.type_identifier),
    )
}

#[must_use]
pub fn contract(name: &str, id: i64, kind: ContractKind) -> TypeDescription {
    let keyword = match kind {
        ContractKind::Library => "library",
        ContractKind::Contract | ContractKind::Interface => "contract",
    };
    TypeDescription::new(format!("{keyword} {name}"), format!("t_contract$_{name}_${id}"))
}

#[must_use]
pub fn structure(canonical_name: &str, name: &str, id: i64) -> TypeDescription {
    TypeDescription::new(
        format!("struct {canonical_name}"),
        format!("t_struct$_{name}_${id}"),
    )
}

#[must_use]
pub fn enumeration(canonical_name: &str, name: &str, id: i64) -> TypeDescription {
    TypeDescription::new(format!("enum {canonical_name}"), format!("t_enum$_{name}_${id}"))
}

#[must_use]
pub fn user_defined_value_type(canonical_name: &str, name: &str, id: i64) -> TypeDescription {
    TypeDescription::new(
        canonical_name,
        format!("t_userDefinedValueType$_{name}_${id}"),
    )
}

#[must_use]
pub fn event(name: &str, id: i64) -> TypeDescription {
    TypeDescription::new(format!("event {name}"), format!("t_event$_{name}_${id}"))
}

#[must_use]
pub fn error(name: &str, id: i64) -> TypeDescription {
    TypeDescription::new(format!("error {name}"), format!("t_error$_{name}_${id}"))
}

#[must_use]
pub fn modifier(name: &str, id: i64) -> TypeDescription {
    TypeDescription::new(format!("modifier {name}"), format!("t_modifier$_{name}_${id}"))
}

#[must_use]
pub fn module(path: &str, id: i64) -> TypeDescription {
    TypeDescription::new(format!("module \"{path}\""), format!("t_module_{id}"))
}

/// Type of a function definition or a function type name.
#[must_use]
pub fn function(
    visibility: Visibility,
    state_mutability: StateMutability,
    parameters: &[TypeDescription],
    returns: &[TypeDescription],
) -> TypeDescription {
    let mut type_string = format!("function ({})", type_strings(parameters));
    if visibility == Visibility::External {
        type_string.push_str(" external");
    }
    if state_mutability != StateMutability::NonPayable {
        type_string.push(' ');
        type_string.push_str(state_mutability.as_str());
    }
    if !returns.is_empty() {
        type_string.push_str(&format!(" returns ({})", type_strings(returns)));
    }
    let kind = if visibility == Visibility::External {
        "external"
    } else {
        "internal"
    };
    let type_identifier = format!(
        "t_function_{kind}_{}{}returns{}",
        state_mutability.as_str(),
        identifier_segment(parameters.iter().map(|t| t.type_identifier.as_str())),
        identifier_segment(returns.iter().map(|t| t.type_identifier.as_str())),
    );
    TypeDescription::new(type_string, type_identifier)
}

/// Result type of calling something with the given return types.
#[must_use]
pub fn call_result(returns: &[TypeDescription]) -> TypeDescription {
    match returns {
        [single] => single.clone(),
        many => tuple(many),
    }
}

#[must_use]
pub fn meta_type(inner: &TypeDescription) -> TypeDescription {
    TypeDescription::new(
        format!("type({})", inner.type_string),
        format!("t_magic_meta_type_{}", inner.type_identifier),
    )
}

/// Hardcoded descriptors for the language's built-in identifiers.
#[must_use]
pub fn magic_identifier(name: &str) -> Option<TypeDescription> {
    let (type_string, suffix) = match name {
        "msg" => ("msg", "message"),
        "block" => ("block", "block"),
        "tx" => ("tx", "transaction"),
        "abi" => ("abi", "abi"),
        "super" => ("super", "super"),
        "this" => ("this", "this"),
        "now" => ("now", "now"),
        "require" => ("function (bool) pure", "require"),
        "assert" => ("function (bool) pure", "assert"),
        "origin" => ("origin", "origin"),
        _ => return None,
    };
    Some(TypeDescription::new(type_string, format!("t_magic_{suffix}")))
}

/// Concrete type of `receiver.member` for built-in receivers.
///
/// Function members (`abi.encode`, `addr.call`) are described by the type of their
/// call result, so a call through them takes the member's type.
#[must_use]
pub fn magic_member(receiver: &TypeDescription, member: &str) -> Option<TypeDescription> {
    let id = receiver.type_identifier.as_str();
    match id {
        "t_magic_message" => match member {
            "sender" => Some(address(false)),
            "value" | "gas" => Some(uint256()),
            "data" => Some(TypeDescription::new("bytes calldata", "t_bytes_calldata_ptr")),
            "sig" => Some(fixed_bytes(4)),
            _ => None,
        },
        "t_magic_block" => match member {
            "timestamp" | "number" | "difficulty" | "prevrandao" | "gaslimit" | "chainid"
            | "basefee" | "blobbasefee" => Some(uint256()),
            "coinbase" => Some(address(true)),
            _ => None,
        },
        "t_magic_transaction" => match member {
            "origin" => Some(address(false)),
            "gasprice" => Some(uint256()),
            _ => None,
        },
        "t_magic_abi" => match member {
            "encode" | "encodePacked" | "encodeWithSelector" | "encodeWithSignature"
            | "encodeCall" => Some(bytes_memory()),
            _ => None,
        },
        _ if id.starts_with("t_magic_meta_type_") => match member {
            "name" => Some(string_memory()),
            "creationCode" | "runtimeCode" => Some(bytes_memory()),
            "interfaceId" => Some(fixed_bytes(4)),
            _ => None,
        },
        _ if id.starts_with("t_address") => match member {
            "balance" => Some(uint256()),
            "code" => Some(bytes_memory()),
            "codehash" => Some(fixed_bytes(32)),
            "send" => Some(bool_type()),
            "transfer" => Some(tuple(&[])),
            "call" | "delegatecall" | "staticcall" => Some(tuple(&[bool_type(), bytes_memory()])),
            _ => None,
        },
        _ if id.starts_with("t_function") => match member {
            "selector" => Some(fixed_bytes(4)),
            "address" => Some(address(false)),
            _ => None,
        },
        _ if id.starts_with("t_array$") || id.starts_with("t_bytes_") || id == "t_bytes" => {
            (member == "length").then(uint256)
        }
        _ => None,
    }
}

/// Globally available functions: the callee type and the type of a call to it.
#[must_use]
pub fn builtin_function(name: &str) -> Option<(TypeDescription, TypeDescription)> {
    let bytes = TypeDescription::new("bytes memory", "t_bytes_memory_ptr");
    let (mutability, parameters, result) = match name {
        "keccak256" | "sha256" => (StateMutability::Pure, vec![bytes], fixed_bytes(32)),
        "ripemd160" => (StateMutability::Pure, vec![bytes], fixed_bytes(20)),
        "ecrecover" => (
            StateMutability::Pure,
            vec![fixed_bytes(32), elementary("uint8", false), fixed_bytes(32), fixed_bytes(32)],
            address(false),
        ),
        "addmod" | "mulmod" => (
            StateMutability::Pure,
            vec![uint256(), uint256(), uint256()],
            uint256(),
        ),
        "gasleft" => (StateMutability::View, Vec::new(), uint256()),
        "blockhash" | "blobhash" => (StateMutability::View, vec![uint256()], fixed_bytes(32)),
        "selfdestruct" => (StateMutability::NonPayable, vec![address(true)], tuple(&[])),
        "revert" => (StateMutability::Pure, Vec::new(), tuple(&[])),
        "require" | "assert" => (StateMutability::Pure, vec![bool_type()], tuple(&[])),
        _ => return None,
    };
    let returns: Vec<TypeDescription> = if result == tuple(&[]) {
        Vec::new()
    } else {
        vec![result.clone()]
    };
    Some((
        function(Visibility::Internal, mutability, &parameters, &returns),
        result,
    ))
}

fn rational(numerator: &str, denominator: &str) -> TypeDescription {
    let type_string = if denominator == "1" {
        format!("int_const {numerator}")
    } else {
        format!("rational_const {numerator} / {denominator}")
    };
    TypeDescription::new(
        type_string,
        format!("t_rational_{numerator}_by_{denominator}"),
    )
}

fn ether_shift(unit: &str) -> Option<i64> {
    match unit {
        "wei" => Some(0),
        "gwei" => Some(9),
        "szabo" => Some(12),
        "finney" => Some(15),
        "ether" => Some(18),
        _ => None,
    }
}

fn time_factor(unit: &str) -> Option<u128> {
    match unit {
        "seconds" => Some(1),
        "minutes" => Some(60),
        "hours" => Some(3_600),
        "days" => Some(86_400),
        "weeks" => Some(604_800),
        "years" => Some(31_536_000),
        _ => None,
    }
}

/// Splits a decimal literal into an unreduced numerator/denominator pair, moving
/// the decimal point right by `shift` places. The numerator is the concatenated
/// digits read as a number, so leading zeros go: `0.5` and `.5` are both `5/10`.
fn decimal_rational(text: &str, shift: i64) -> Option<(String, String)> {
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(at) => (&text[..at], text[at + 1..].parse::<i64>().ok()?),
        None => (text, 0),
    };
    let (integer, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if integer.is_empty() && fraction.is_empty() {
        return None;
    }
    if !integer
        .bytes()
        .chain(fraction.bytes())
        .all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let scale = exponent
        .checked_add(shift)?
        .checked_sub(i64::try_from(fraction.len()).ok()?)?;
    if scale.unsigned_abs() > MAX_SCALE {
        return None;
    }
    let digits = format!("{integer}{fraction}");
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Some(("0".to_string(), "1".to_string()));
    }
    let zeros = "0".repeat(usize::try_from(scale.unsigned_abs()).ok()?);
    if scale >= 0 {
        Some((format!("{digits}{zeros}"), "1".to_string()))
    } else {
        Some((digits.to_string(), format!("1{zeros}")))
    }
}

/// Type of a numeric literal with an optional sub-denomination.
///
/// Returns `None` when the text is not a well-formed number.
#[must_use]
pub fn number_literal(text: &str, unit: Option<&str>) -> Option<TypeDescription> {
    let text: String = text.chars().filter(|c| *c != '_').collect();
    if let Some(digits) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let numerator = match u128::from_str_radix(digits, 16) {
            Ok(value) => value.to_string(),
            Err(_) => format!("0x{}", digits.to_ascii_lowercase()),
        };
        return Some(rational(&numerator, "1"));
    }

    let shift = unit.and_then(ether_shift).unwrap_or(0);
    let (mut numerator, denominator) = decimal_rational(&text, shift)?;
    if let Some(factor) = unit.and_then(time_factor)
        && let Some(scaled) = numerator
            .parse::<u128>()
            .ok()
            .and_then(|value| value.checked_mul(factor))
    {
        numerator = scaled.to_string();
    }
    Some(rational(&numerator, &denominator))
}

/// Extracts the quoted bodies of a possibly concatenated literal such as `"a" 'b'`.
fn quoted_segments<'a>(raw: &'a str, prefix: &str) -> Result<Vec<&'a str>, String> {
    let mut segments = Vec::new();
    let mut rest = raw.trim();
    while !rest.is_empty() {
        rest = rest
            .strip_prefix(prefix)
            .ok_or_else(|| format!("expected `{prefix}` before a quoted segment"))?;
        let quote = rest
            .chars()
            .next()
            .filter(|c| *c == '"' || *c == '\'')
            .ok_or_else(|| "expected a quote".to_string())?;
        let body = &rest[1..];
        let mut escaped = false;
        let mut close = None;
        for (at, c) in body.char_indices() {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                close = Some(at);
                break;
            }
        }
        let close = close.ok_or_else(|| "unterminated literal".to_string())?;
        segments.push(&body[..close]);
        rest = body[close + 1..].trim_start();
    }
    Ok(segments)
}

fn unescape(body: &str, out: &mut Vec<u8>) -> Result<(), String> {
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buffer = [0; 4];
            out.extend_from_slice(c.encode_utf8(&mut buffer).as_bytes());
            continue;
        }
        match chars.next() {
            Some('n') => out.push(b'\n'),
            Some('r') => out.push(b'\r'),
            Some('t') => out.push(b'\t'),
            Some('\\') => out.push(b'\\'),
            Some('\'') => out.push(b'\''),
            Some('"') => out.push(b'"'),
            Some('\n') => {}
            Some('x') => {
                let digits: String = chars.by_ref().take(2).collect();
                let byte = u8::from_str_radix(&digits, 16)
                    .map_err(|_| format!("invalid escape `\\x{digits}`"))?;
                out.push(byte);
            }
            Some('u') => {
                let digits: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&digits, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| format!("invalid escape `\\u{digits}`"))?;
                let mut buffer = [0; 4];
                out.extend_from_slice(decoded.encode_utf8(&mut buffer).as_bytes());
            }
            Some(other) => return Err(format!("invalid escape `\\{other}`")),
            None => return Err("dangling escape".to_string()),
        }
    }
    Ok(())
}

/// Decodes a (possibly concatenated) string literal into its bytes.
///
/// # Errors
///
/// Returns a description of the problem when a segment is unterminated or holds
/// an invalid escape sequence.
pub fn decode_string_literal(raw: &str, prefix: &str) -> Result<Vec<u8>, String> {
    let mut out = Vec::new();
    for segment in quoted_segments(raw, prefix)? {
        unescape(segment, &mut out)?;
    }
    Ok(out)
}

/// Decodes a (possibly concatenated) `hex"..."` literal.
///
/// # Errors
///
/// Returns a description of the problem when the digits are not an even-length
/// hexadecimal sequence.
pub fn decode_hex_literal(raw: &str) -> Result<Vec<u8>, String> {
    let mut digits = String::new();
    for segment in quoted_segments(raw, "hex")? {
        digits.extend(segment.chars().filter(|c| *c != '_'));
    }
    hex::decode(&digits).map_err(|e| e.to_string())
}

#[must_use]
pub fn string_literal(raw: &str) -> TypeDescription {
    TypeDescription::new(format!("literal_string {raw}"), "t_string_literal")
}

#[must_use]
pub fn hex_string_literal(raw: &str) -> TypeDescription {
    TypeDescription::new(format!("literal_hex_string {raw}"), "t_hex_string_literal")
}

#[must_use]
pub fn unicode_string_literal(raw: &str) -> TypeDescription {
    TypeDescription::new(
        format!("literal_unicode_string {raw}"),
        "t_unicode_string_literal",
    )
}

/// Whether an argument of type `argument` can be passed for a parameter of type
/// `parameter`, used to pick between overloads.
#[must_use]
pub fn argument_matches(argument: &TypeDescription, parameter: &TypeDescription) -> bool {
    let argument = argument.type_identifier.as_str();
    let parameter = parameter.type_identifier.as_str();
    if argument == parameter {
        return true;
    }
    if argument.starts_with("t_rational_") {
        return parameter.starts_with("t_uint") || parameter.starts_with("t_int");
    }
    if argument.ends_with("string_literal") {
        return parameter.starts_with("t_string") || parameter.starts_with("t_bytes");
    }
    let strip = |id: &str| {
        ["_memory_ptr", "_calldata_ptr", "_storage_ptr", "_storage"]
            .iter()
            .find_map(|suffix| id.strip_suffix(suffix))
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string())
    };
    strip(argument) == strip(parameter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_literal_is_rational_over_one() {
        let ty = number_literal("42", None).unwrap();
        assert_eq!(ty.type_identifier, "t_rational_42_by_1");
        assert_eq!(ty.type_string, "int_const 42");
    }

    #[test]
    fn fixed_point_literal_keeps_fraction_digits() {
        let ty = number_literal("3.14", None).unwrap();
        assert_eq!(ty.type_identifier, "t_rational_314_by_100");
        assert_eq!(ty.type_string, "rational_const 314 / 100");
        assert_eq!(
            number_literal(".5", None).unwrap().type_identifier,
            "t_rational_5_by_10"
        );
        assert_eq!(
            number_literal("0.5", None).unwrap().type_identifier,
            "t_rational_5_by_10"
        );
        assert_eq!(
            number_literal("00.05", None).unwrap().type_identifier,
            "t_rational_5_by_100"
        );
    }

    #[test]
    fn exponent_and_ether_units_move_the_decimal_point() {
        assert_eq!(
            number_literal("1e18", None).unwrap().type_identifier,
            "t_rational_1000000000000000000_by_1"
        );
        assert_eq!(
            number_literal("2.5e-3", None).unwrap().type_identifier,
            "t_rational_25_by_10000"
        );
        assert_eq!(
            number_literal("1", Some("gwei")).unwrap().type_identifier,
            "t_rational_1000000000_by_1"
        );
        assert_eq!(
            number_literal("0.5", Some("ether")).unwrap().type_identifier,
            "t_rational_500000000000000000_by_1"
        );
    }

    #[test]
    fn time_units_multiply() {
        assert_eq!(
            number_literal("2", Some("days")).unwrap().type_identifier,
            "t_rational_172800_by_1"
        );
    }

    #[test]
    fn hex_numbers_become_decimal_when_small() {
        assert_eq!(
            number_literal("0x1F", None).unwrap().type_identifier,
            "t_rational_31_by_1"
        );
        let wide = format!("0x{}", "f".repeat(40));
        assert_eq!(
            number_literal(&wide, None).unwrap().type_identifier,
            format!("t_rational_0x{}_by_1", "f".repeat(40))
        );
    }

    #[test]
    fn underscores_are_separators() {
        assert_eq!(
            number_literal("1_000", None).unwrap().type_identifier,
            "t_rational_1000_by_1"
        );
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert!(number_literal("1.2.3", None).is_none());
        assert!(number_literal("0x", None).is_none());
        assert!(number_literal("1e", None).is_none());
        assert!(number_literal("1e999999", None).is_none());
    }

    #[test]
    fn comparisons_are_bool_and_arithmetic_follows_left() {
        let left = uint256();
        assert_eq!(binary(BinaryOperator::Lt, Some(&left)), Some(bool_type()));
        assert_eq!(binary(BinaryOperator::Eq, None), Some(bool_type()));
        assert_eq!(binary(BinaryOperator::And, None), Some(bool_type()));
        assert_eq!(binary(BinaryOperator::Add, Some(&left)), Some(uint256()));
        assert_eq!(binary(BinaryOperator::Shl, None), None);
    }

    #[test]
    fn unary_rules() {
        assert_eq!(unary(UnaryOperator::Not, None), Some(bool_type()));
        assert_eq!(
            unary(UnaryOperator::Delete, Some(&uint256())).unwrap().type_identifier,
            "t_tuple$__$"
        );
        assert_eq!(unary(UnaryOperator::Neg, Some(&uint256())), Some(uint256()));
    }

    #[test]
    fn tuple_and_callee_identifiers() {
        let parts = [uint256(), bool_type()];
        let ty = tuple(&parts);
        assert_eq!(ty.type_string, "tuple(uint256,bool)");
        assert_eq!(ty.type_identifier, "t_tuple$_t_uint256_$_t_bool_$");

        let callee = callee_signature(&parts);
        assert_eq!(callee.type_string, "function(uint256,bool)");
        assert_eq!(callee.type_identifier, "t_function$_t_uint256_$_t_bool_$");
    }

    #[test]
    fn builtin_functions_carry_their_result_types() {
        let (callee, result) = builtin_function("keccak256").unwrap();
        assert_eq!(result.type_identifier, "t_bytes32");
        assert_eq!(
            callee.type_identifier,
            "t_function_internal_pure$_t_bytes_memory_ptr_$returns$_t_bytes32_$"
        );
        let (_, result) = builtin_function("selfdestruct").unwrap();
        assert_eq!(result.type_identifier, "t_tuple$__$");
        assert!(builtin_function("transfer").is_none());
    }

    #[test]
    fn elementary_names_are_canonical() {
        assert_eq!(elementary("uint", false).type_identifier, "t_uint256");
        assert_eq!(elementary("address", true).type_identifier, "t_address_payable");
        assert_eq!(elementary("byte", false).type_string, "bytes1");
    }

    #[test]
    fn locations_only_apply_to_reference_types() {
        let string = elementary("string", false);
        assert_eq!(
            located(&string, StorageLocation::Memory, false).type_identifier,
            "t_string_memory_ptr"
        );
        assert_eq!(
            located(&string, StorageLocation::Default, true).type_identifier,
            "t_string_storage"
        );
        assert_eq!(
            located(&uint256(), StorageLocation::Memory, false),
            uint256()
        );
        let numbers = array(&uint256(), None);
        assert_eq!(
            located(&numbers, StorageLocation::Memory, false).type_identifier,
            "t_array$_t_uint256_$dyn_memory_ptr"
        );
        let balances = mapping(&address(false), &uint256());
        assert_eq!(balances.type_identifier, "t_mapping$_t_address_$_t_uint256_$");
        assert_eq!(
            located(&balances, StorageLocation::Default, true),
            balances
        );
    }

    #[test]
    fn magic_members() {
        let msg = magic_identifier("msg").unwrap();
        assert_eq!(msg.type_identifier, "t_magic_message");
        assert_eq!(magic_member(&msg, "sender"), Some(address(false)));
        assert_eq!(magic_member(&msg, "value"), Some(uint256()));
        let block = magic_identifier("block").unwrap();
        assert_eq!(magic_member(&block, "timestamp"), Some(uint256()));
        assert_eq!(magic_member(&block, "coinbase"), Some(address(true)));
        assert_eq!(magic_member(&address(false), "balance"), Some(uint256()));
        assert!(magic_member(&msg, "nonsense").is_none());
    }

    #[test]
    fn string_escapes_and_concatenation() {
        assert_eq!(
            decode_string_literal(r#""a\n" 'b\x41'"#, "").unwrap(),
            b"a\nbA".to_vec()
        );
        assert_eq!(
            decode_string_literal(r#"unicode"é""#, "unicode").unwrap(),
            "é".as_bytes().to_vec()
        );
        assert!(decode_string_literal(r#""\q""#, "").is_err());
        assert!(decode_string_literal(r#""open"#, "").is_err());
    }

    #[test]
    fn hex_literals_decode() {
        assert_eq!(decode_hex_literal(r#"hex"00ff" hex'0A'"#).unwrap(), vec![0, 255, 10]);
        assert!(decode_hex_literal(r#"hex"abc""#).is_err());
    }

    #[test]
    fn overload_matching() {
        let literal = number_literal("1", None).unwrap();
        assert!(argument_matches(&literal, &uint256()));
        assert!(!argument_matches(&literal, &address(false)));
        assert!(argument_matches(
            &string_literal("\"x\""),
            &located(&elementary("string", false), StorageLocation::Memory, false)
        ));
        assert!(argument_matches(
            &TypeDescription::new("string storage ref", "t_string_storage"),
            &TypeDescription::new("string memory", "t_string_memory_ptr"),
        ));
    }
}
