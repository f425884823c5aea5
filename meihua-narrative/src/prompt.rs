//! Prompt assembly from a divination result.

use meihua_core::elements::Relationships;
use meihua_core::{DivinationResult, Hexagram, QuestionCategory};

/// Section headings the model is asked to produce.
pub const SECTION_OVERVIEW: &str = "卦象总体含义";
pub const SECTION_ANALYSIS: &str = "针对问题的分析";
pub const SECTION_ADVICE: &str = "实用建议";
pub const SECTION_TIMING: &str = "时机把握";

const SYSTEM_PROMPT: &str = "你是一位精通梅花易数的专业占卜师。";

/// Assembles interpretation prompts.
pub struct PromptAssembler;

impl PromptAssembler {
    pub fn system_prompt() -> &'static str {
        SYSTEM_PROMPT
    }

    /// Build the user prompt asking for a four-section reading.
    pub fn build_interpretation_prompt(result: &DivinationResult, category: QuestionCategory) -> String {
        let analysis = &result.element_analysis;
        let mut prompt = String::new();

        prompt.push_str("请基于以下卦象信息为用户提供专业解读：\n\n");
        prompt.push_str(&format!("**用户问题**：{}\n", result.question));
        prompt.push_str(&format!("**问题类型**：{}\n\n", category.description()));

        prompt.push_str("**卦象信息**：\n");
        prompt.push_str(&format!("- 本卦：{}\n", Self::describe(&result.primary)));
        prompt.push_str(&format!("- 互卦：{}\n", Self::describe(&result.mutual)));
        prompt.push_str(&format!("- 变卦：{}\n", Self::describe(&result.transformed)));
        prompt.push_str(&format!("- 动爻：第{}爻\n\n", result.moving_line));

        prompt.push_str("**五行分析**：\n");
        prompt.push_str(&format!("- 本卦五行：{}\n", analysis.primary.chinese()));
        prompt.push_str(&format!("- 互卦五行：{}\n", analysis.mutual.chinese()));
        prompt.push_str(&format!("- 变卦五行：{}\n", analysis.transformed.chinese()));
        prompt.push_str(&format!(
            "- 五行关系：{}\n",
            Self::format_relationships(&analysis.relationships)
        ));
        prompt.push_str(&format!("- 总体运势：{}\n\n", result.fortune.description()));

        prompt.push_str("**基础解读**：\n");
        prompt.push_str(&result.basic_interpretation.summary);
        prompt.push_str("\n\n");

        prompt.push_str("请提供：\n");
        prompt.push_str(&format!("1. **{SECTION_OVERVIEW}**（100-150字）：解释卦象的核心寓意\n"));
        prompt.push_str("2. **针对具体问题的分析**（150-200字）：结合用户问题进行深入分析\n");
        prompt.push_str("3. **实用建议和指导**（100-120字）：给出具体可行的建议\n");
        prompt.push_str(&format!("4. **{SECTION_TIMING}**（50-80字）：分析行动的最佳时机\n\n"));

        prompt.push_str("要求：\n");
        prompt.push_str("- 语言亲和、积极正面、具有指导意义\n");
        prompt.push_str("- 避免过于玄虚或消极的表述\n");
        prompt.push_str("- 结合现代生活实际情况\n\n");

        prompt.push_str("请按照以下格式回复：\n\n");
        for section in [SECTION_OVERVIEW, SECTION_ANALYSIS, SECTION_ADVICE, SECTION_TIMING] {
            prompt.push_str(&format!("## {section}\n[在此填写{section}]\n\n"));
        }

        prompt
    }

    /// Minimal prompt for connectivity checks.
    pub fn connection_test_prompt() -> &'static str {
        "请回复\"连接测试成功\""
    }

    fn describe(hexagram: &Hexagram) -> String {
        format!(
            "{}（上{}下{}）",
            hexagram.name, hexagram.upper.name, hexagram.lower.name
        )
    }

    fn format_relationships(relationships: &Relationships) -> String {
        [
            ("本卦", relationships.primary_to_mutual, "互卦"),
            ("本卦", relationships.primary_to_transformed, "变卦"),
            ("互卦", relationships.mutual_to_transformed, "变卦"),
        ]
        .iter()
        .map(|(from, rel, to)| format!("{from}{}{to}（{}）", rel.meaning(), rel.description()))
        .collect::<Vec<_>>()
        .join("，")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meihua_core::{DivinationEngine, DivinationParams};

    fn result() -> DivinationResult {
        DivinationEngine::new()
            .perform_divination("今年换工作好吗", "number", &DivinationParams::numbers(9, 17))
            .unwrap()
    }

    #[test]
    fn test_prompt_carries_the_cast() {
        let prompt = PromptAssembler::build_interpretation_prompt(&result(), QuestionCategory::Career);

        assert!(prompt.contains("今年换工作好吗"));
        assert!(prompt.contains("事业发展"));
        assert!(prompt.contains("本卦：乾为天（上乾下乾）"));
        assert!(prompt.contains("变卦：天火同人（上乾下离）"));
        assert!(prompt.contains("动爻：第2爻"));
        assert!(prompt.contains("本卦五行：金"));
        assert!(prompt.contains("本卦乾为天，变卦天火同人"));
    }

    #[test]
    fn test_prompt_requests_all_sections() {
        let prompt = PromptAssembler::build_interpretation_prompt(&result(), QuestionCategory::General);
        for section in [SECTION_OVERVIEW, SECTION_ANALYSIS, SECTION_ADVICE, SECTION_TIMING] {
            assert!(prompt.contains(&format!("## {section}")), "missing {section}");
        }
        assert!(prompt.contains("综合运势"));
    }
}
