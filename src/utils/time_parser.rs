use chrono::{DateTime, Duration, Utc};

pub struct TimeParser;

impl TimeParser {
    /// 解析时间字符串，支持多种格式：
    /// - RFC3339 格式：2023-10-01T12:00:00Z
    /// - 相对时间：1d, 2w, 3m, 1y, 1h30m, 2d12h
    /// - 组合格式：1d2h30m
    pub fn parse_expire_time(input: &str) -> Result<DateTime<Utc>, String> {
        let input = input.trim();

        // 尝试解析 RFC3339 格式
        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Ok(dt.with_timezone(&Utc));
        }

        // 尝试解析相对时间格式
        Self::parse_relative_time(input)
    }

    fn parse_relative_time(input: &str) -> Result<DateTime<Utc>, String> {
        if input.is_empty() {
            return Err("empty time string".to_string());
        }

        let mut total = Duration::zero();
        let mut num_str = String::new();
        let mut matched_any = false;

        for c in input.chars() {
            if c.is_ascii_digit() {
                num_str.push(c);
                continue;
            }

            if num_str.is_empty() {
                return Err(format!("invalid time format: '{}'", input));
            }

            let num: i64 = num_str
                .parse()
                .map_err(|_| format!("invalid number: '{}'", num_str))?;
            num_str.clear();

            total += match c {
                'y' => Duration::days(num * 365),
                'w' => Duration::weeks(num),
                'd' => Duration::days(num),
                'h' => Duration::hours(num),
                'm' => Duration::minutes(num),
                's' => Duration::seconds(num),
                _ => return Err(format!("unknown time unit: '{}'", c)),
            };
            matched_any = true;
        }

        // 尾部残留数字（如 "1h30"）视为格式错误
        if !num_str.is_empty() || !matched_any {
            return Err(format!("invalid time format: '{}'", input));
        }

        Ok(Utc::now() + total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339() {
        let result = TimeParser::parse_expire_time("2030-01-01T00:00:00Z");
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_relative_simple() {
        let now = Utc::now();
        let t = TimeParser::parse_expire_time("1h").unwrap();
        let diff = (t - now).num_minutes();
        assert!((59..=61).contains(&diff));
    }

    #[test]
    fn test_parse_relative_combined() {
        let now = Utc::now();
        let t = TimeParser::parse_expire_time("1d12h").unwrap();
        let diff = (t - now).num_hours();
        assert!((35..=36).contains(&diff));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(TimeParser::parse_expire_time("abc").is_err());
        assert!(TimeParser::parse_expire_time("").is_err());
        assert!(TimeParser::parse_expire_time("1x").is_err());
        assert!(TimeParser::parse_expire_time("1h30").is_err());
    }
}
