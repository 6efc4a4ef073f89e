use crate::constants::{MAX_CATEGORY_LABEL_LEN, MAX_TITLE_LEN};
use crate::error::AppError;

/// Validate time format (HH:MM, 24-hour format).
pub fn validate_time_format(time: &str) -> Result<(), AppError> {
    let err = |reason: &str| AppError::InvalidInput {
        field: "time",
        reason: reason.into(),
    };

    if time.len() != 5 || time.get(2..3) != Some(":") {
        return Err(err("must be in HH:MM format"));
    }

    let hours: u32 = time
        .get(0..2)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| err("invalid hours"))?;
    let minutes: u32 = time
        .get(3..5)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| err("invalid minutes"))?;

    if hours >= 24 {
        return Err(err("hours must be 00-23"));
    }
    if minutes >= 60 {
        return Err(err("minutes must be 00-59"));
    }

    Ok(())
}

/// Validate an optional time field, accepting `None`.
pub fn validate_optional_time(time: Option<&str>) -> Result<(), AppError> {
    match time {
        Some(t) => validate_time_format(t),
        None => Ok(()),
    }
}

/// Validate weekday codes (0=Sunday .. 6=Saturday). At least one is required.
pub fn validate_weekday_codes(codes: &[u8]) -> Result<(), AppError> {
    if codes.is_empty() {
        return Err(AppError::InvalidInput {
            field: "weekdays",
            reason: "at least one weekday required".into(),
        });
    }

    for &code in codes {
        if code > 6 {
            return Err(AppError::InvalidInput {
                field: "weekdays",
                reason: format!("weekday must be 0-6, got {code}"),
            });
        }
    }

    Ok(())
}

/// Validate a category label.
pub fn validate_category_label(label: &str) -> Result<&str, AppError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(AppError::InvalidInput {
            field: "label",
            reason: "cannot be empty".into(),
        });
    }
    if label.len() > MAX_CATEGORY_LABEL_LEN {
        return Err(AppError::InvalidInput {
            field: "label",
            reason: format!("cannot exceed {MAX_CATEGORY_LABEL_LEN} characters"),
        });
    }
    Ok(label)
}

/// Validate a routine title.
pub fn validate_title(title: &str) -> Result<&str, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput {
            field: "title",
            reason: "cannot be empty".into(),
        });
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(AppError::InvalidInput {
            field: "title",
            reason: format!("cannot exceed {MAX_TITLE_LEN} characters"),
        });
    }
    Ok(title)
}

/// Validate a month number (1-12).
pub fn validate_month(month: u32) -> Result<(), AppError> {
    if !(1..=12).contains(&month) {
        return Err(AppError::InvalidInput {
            field: "month",
            reason: format!("must be 1-12, got {month}"),
        });
    }
    Ok(())
}
