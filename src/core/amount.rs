/// Parses a German-formatted amount (`1.234,56`) into a number.
///
/// Every `.` is dropped and every `,` becomes the decimal point. Anything that
/// still does not parse, including a missing cell, counts as `0.0`.
pub fn normalize_amount(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };

    let normalized: String = raw
        .chars()
        .filter(|c| *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    match normalized.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        Ok(_) | Err(_) => {
            tracing::trace!("Amount '{}' is not numeric, counted as 0", raw);
            0.0
        }
    }
}
