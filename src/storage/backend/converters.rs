use tracing::warn;

use crate::storage::models::{Redirect, RuleMatcher, TargetingRule};
use migration::entities::{redirect, targeting_rule};

/// 将 Sea-ORM Model + 规则行转换为领域模型
///
/// 规则行须已按 position 升序排列。
pub fn model_to_redirect(model: redirect::Model, rules: Vec<targeting_rule::Model>) -> Redirect {
    let rules = rules
        .into_iter()
        .filter_map(rule_model_to_rule)
        .collect();

    Redirect {
        short_code: model.short_code,
        target_url: model.target_url,
        description: model.description,
        active: model.active,
        owner_id: model.owner_id,
        created_at: model.created_at,
        starts_at: model.starts_at,
        expires_at: model.expires_at,
        password: model.password,
        og_title: model.og_title,
        og_description: model.og_description,
        og_image: model.og_image,
        rules,
    }
}

/// 规则行 → tagged variant；未知 kind 丢弃并告警
fn rule_model_to_rule(model: targeting_rule::Model) -> Option<TargetingRule> {
    let matcher = match model.kind.as_str() {
        "device" => RuleMatcher::Device(model.match_key),
        "geo" => RuleMatcher::Geo(model.match_key),
        other => {
            warn!(
                "Dropping targeting rule {} with unknown kind '{}'",
                model.id, other
            );
            return None;
        }
    };

    Some(TargetingRule {
        matcher,
        target_url: model.target_url,
    })
}

/// 将领域模型转换为 ActiveModel（用于插入/更新）
pub fn redirect_to_active_model(link: &Redirect, is_new: bool) -> redirect::ActiveModel {
    use sea_orm::ActiveValue::*;

    redirect::ActiveModel {
        short_code: Set(link.short_code.clone()),
        target_url: Set(link.target_url.clone()),
        description: Set(link.description.clone()),
        active: Set(link.active),
        owner_id: if is_new {
            Set(link.owner_id.clone())
        } else {
            NotSet
        },
        created_at: if is_new { Set(link.created_at) } else { NotSet },
        starts_at: Set(link.starts_at),
        expires_at: Set(link.expires_at),
        password: Set(link.password.clone()),
        og_title: Set(link.og_title.clone()),
        og_description: Set(link.og_description.clone()),
        og_image: Set(link.og_image.clone()),
    }
}

/// 规则 → ActiveModel，position 由调用方按插入顺序编号
pub fn rule_to_active_model(
    code: &str,
    position: i32,
    rule: &TargetingRule,
) -> targeting_rule::ActiveModel {
    use sea_orm::ActiveValue::*;

    targeting_rule::ActiveModel {
        id: NotSet,
        redirect_code: Set(code.to_string()),
        position: Set(position),
        kind: Set(rule.matcher.kind().to_string()),
        match_key: Set(rule.matcher.key().to_string()),
        target_url: Set(rule.target_url.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::ActiveValue;

    fn test_model() -> redirect::Model {
        redirect::Model {
            short_code: "abc123".to_string(),
            target_url: Some("https://example.com".to_string()),
            description: None,
            active: true,
            owner_id: "user_1".to_string(),
            created_at: Utc::now(),
            starts_at: None,
            expires_at: None,
            password: None,
            og_title: None,
            og_description: None,
            og_image: None,
        }
    }

    fn rule_model(id: i64, kind: &str, key: &str) -> targeting_rule::Model {
        targeting_rule::Model {
            id,
            redirect_code: "abc123".to_string(),
            position: id as i32,
            kind: kind.to_string(),
            match_key: key.to_string(),
            target_url: "https://override.example.com".to_string(),
        }
    }

    #[test]
    fn test_model_to_redirect_with_rules() {
        let link = model_to_redirect(
            test_model(),
            vec![rule_model(0, "device", "mobile"), rule_model(1, "geo", "US")],
        );

        assert_eq!(link.short_code, "abc123");
        assert_eq!(link.rules.len(), 2);
        assert_eq!(
            link.rules[0].matcher,
            RuleMatcher::Device("mobile".to_string())
        );
        assert_eq!(link.rules[1].matcher, RuleMatcher::Geo("US".to_string()));
    }

    #[test]
    fn test_unknown_rule_kind_dropped() {
        let link = model_to_redirect(test_model(), vec![rule_model(0, "weather", "rainy")]);
        assert!(link.rules.is_empty());
    }

    #[test]
    fn test_redirect_to_active_model_update_keeps_identity() {
        let link = model_to_redirect(test_model(), vec![]);
        let active = redirect_to_active_model(&link, false);

        // 更新时 owner_id 和 created_at 不可变
        assert!(matches!(active.owner_id, ActiveValue::NotSet));
        assert!(matches!(active.created_at, ActiveValue::NotSet));
        assert!(matches!(active.short_code, ActiveValue::Set(_)));
    }

    #[test]
    fn test_rule_to_active_model() {
        let rule = TargetingRule {
            matcher: RuleMatcher::Geo("DE".to_string()),
            target_url: "https://de.example.com".to_string(),
        };
        let active = rule_to_active_model("abc123", 3, &rule);

        assert!(matches!(active.kind, ActiveValue::Set(ref k) if k == "geo"));
        assert!(matches!(active.match_key, ActiveValue::Set(ref k) if k == "DE"));
        assert!(matches!(active.position, ActiveValue::Set(3)));
    }
}
