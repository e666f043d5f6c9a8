//! Built-in agreement templates.

use crate::safety::SafetyMeasure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsentTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub consent_details: &'static str,
    pub safety_measures: &'static [SafetyMeasure],
    pub privacy_terms: &'static str,
    pub revocation_terms: &'static str,
}

const TEMPLATES: [ConsentTemplate; 3] = [
    ConsentTemplate {
        id: "basic",
        name: "基础同意协议",
        description: "最基本的性同意协议，包含必要的同意表述和安全措施",
        consent_details: "我们双方在完全自愿、理性和清醒的状态下，同意进行亲密行为。我们确认彼此已经达到法定成年年龄，并且对可能发生的行为有充分理解。我们承诺相互尊重对方的边界和意愿，任何一方都有权随时终止行为而无需解释原因。",
        safety_measures: &[
            SafetyMeasure::Contraception,
            SafetyMeasure::StiTesting,
            SafetyMeasure::SafeWords,
            SafetyMeasure::NoRecording,
        ],
        privacy_terms: "我们承诺对本次关系的细节保持私密，不向第三方分享对方的隐私信息。我们同意不在未经对方明确许可的情况下，向任何人透露此次互动的具体细节。",
        revocation_terms: "任何一方都可以在任何时候撤回同意，而无需提供理由。撤回同意应该被尊重和立即执行，不得有任何形式的强迫或胁迫。",
    },
    ConsentTemplate {
        id: "detailed",
        name: "详细同意协议",
        description: "更详细的性同意协议，包含具体行为边界和个人偏好",
        consent_details: "我们双方在完全自愿、理性和清醒的状态下，同意进行亲密行为。我们确认彼此已经达到法定成年年龄，并且对可能发生的行为有充分理解。我们已经讨论并同意了可接受的互动范围，包括但不限于哪些行为是可以的，哪些是不可接受的。我们将在整个过程中保持沟通，并尊重彼此设定的边界。我们理解，即使之前同意了某种行为，任何一方在任何时候都有权改变主意。",
        safety_measures: &[
            SafetyMeasure::Contraception,
            SafetyMeasure::StiTesting,
            SafetyMeasure::SafeWords,
            SafetyMeasure::NoRecording,
            SafetyMeasure::Other,
        ],
        privacy_terms: "我们承诺对本次关系的细节保持私密，不向第三方分享对方的隐私信息。未经明确同意，不得分享、发布或传播与对方相关的任何信息、照片或录像。此外，我们同意在社交媒体上不发布任何可能暗示或揭示我们关系的内容。",
        revocation_terms: "任何一方都可以在任何时候撤回同意，而无需提供理由。我们同意使用安全词系统：红灯表示立即停止当前行为；黄灯表示放慢或调整当前行为。一旦安全词被使用，另一方应立即响应并停止或调整行为。",
    },
    ConsentTemplate {
        id: "long-term",
        name: "长期关系协议",
        description: "适用于长期伴侣的性同意协议，包含更多关系维护内容",
        consent_details: "作为长期伴侣关系的一部分，我们同意在我们关系中的亲密行为应基于相互尊重、信任和持续的沟通。我们承诺定期讨论和更新我们的边界和舒适区，并且尊重这些边界。我们理解，即使在长期关系中，每次亲密行为都需要双方的积极同意，而非被动不拒绝。我们同意在情绪不佳、压力大或其他影响判断的情况下，可以暂缓亲密行为，而不会对关系产生负面影响。",
        safety_measures: &[
            SafetyMeasure::Contraception,
            SafetyMeasure::StiTesting,
            SafetyMeasure::SafeWords,
            SafetyMeasure::Other,
        ],
        privacy_terms: "作为长期伴侣，我们同意尊重彼此的隐私和数字边界。未经明确同意，不得分享或向第三方透露彼此的亲密细节。如果关系状态发生变化，我们同意保护彼此过去的隐私，不将亲密细节作为谈资或报复手段。",
        revocation_terms: "即使在长期关系中，我们认可任何一方都有权在任何时候撤回同意的权利。我们承诺不会因为对方拒绝亲密行为而施加情感压力或消极反应。我们同意建立一个安全的沟通环境，使双方都能自由表达自己的意愿和边界，而不担心遭到批评或拒绝。",
    },
];

pub fn templates() -> &'static [ConsentTemplate] {
    &TEMPLATES
}

/// Look up a template by id; the `template-` prefix is optional.
pub fn find_template(id: &str) -> Option<&'static ConsentTemplate> {
    let key = id.strip_prefix("template-").unwrap_or(id);
    TEMPLATES.iter().find(|t| t.id == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NewConsentRecord;

    #[test]
    fn finds_templates_with_or_without_prefix() {
        assert_eq!(find_template("basic").unwrap().name, "基础同意协议");
        assert_eq!(find_template("template-long-term").unwrap().id, "long-term");
        assert!(find_template("missing").is_none());
    }

    #[test]
    fn applying_a_template_fills_clauses() {
        let mut draft = NewConsentRecord::default();
        draft.apply_template(find_template("detailed").unwrap());
        assert_eq!(draft.safety_measures.len(), 5);
        assert!(draft.revocation_terms.contains("安全词"));
        assert!(!draft.privacy_terms.is_empty());
    }
}
