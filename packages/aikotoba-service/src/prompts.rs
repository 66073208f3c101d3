use aikotoba_domain::{
	axes::{AxisScores, LoveAxis},
	lexicon::LoveWord,
};
use aikotoba_providers::ChatMessage;

pub fn analyzer(free_text: &str) -> Vec<ChatMessage> {
	let axis_instruction = LoveAxis::ALL
		.iter()
		.map(|axis| format!("- {}: 0.0〜1.0で評価", axis.as_str()))
		.collect::<Vec<_>>()
		.join("\n");
	let system = "あなたは文化言語学の研究員です。入力された愛に関する自由記述を要約し、指定された軸で0.0〜1.0の連続値スコアを出力してください。\n\
出力は必ずJSONのみ: {\"summary\":\"...\", \"scores\":{ \"<axis>\":0.0〜1.0 }}\n\
スコアは0.0以上1.0以下の小数（小数第2位程度）で提供し、全軸について値を埋めてください。\n\
要約は200字以内の自然な日本語で書いてください。";
	let user = format!("入力:\n{free_text}\n\n評価軸:\n{axis_instruction}");

	vec![ChatMessage::system(system), ChatMessage::user(user)]
}

pub fn matcher(summary: &str, scores: &AxisScores, candidates: &[LoveWord]) -> Vec<ChatMessage> {
	let system = "あなたは文化言語学の編集者です。候補語彙から最適な語を1〜3語だけ選び、\n\
各語に100〜140字の適合理由と30字以内のSNS向けキャッチを日本語で生成してください。\n\
出力は必ずJSONのみ:\n\
{ \"picks\": [{\"id\":\"...\",\"term\":\"...\",\"lang\":\"...\",\"gloss\":\"...\",\"reason\":\"...\",\"catchphrase\":\"...\"}] }\n\
理由は敬体ではなく常体で端的にまとめ、キャッチは語を含めてもよいが30字以内で完結させます。";
	let user = format!(
		"診断要約:\n{summary}\n\nスコア:\n{}\n\n候補語彙:\n{}\n\n\
条件:\n\
- 候補以外を選ばない\n\
- 日本語候補は他言語よりも明確な適合理由がある場合のみ選ぶ。その際は理由にその判断根拠を書く\n\
- glossが空なら空文字を返してよい\n\
- reasonは100〜140字、catchphraseは30字以内\n\
- JSON以外のテキストを出力しない",
		score_sheet(scores),
		candidate_sheet(candidates),
	);

	vec![ChatMessage::system(system), ChatMessage::user(user)]
}

pub fn reflection(
	summary: &str,
	excerpts: &[String],
	candidates: &[LoveWord],
) -> Vec<ChatMessage> {
	let system = "あなたは文化言語学の研究員です。回答からの短い引用と診断要約をもとに、\n\
読み手の心に静かに残る150字以内の解釈文と、その文章の語り口を一語で表すトーンを日本語で書いてください。\n\
出力は必ずJSONのみ: {\"excerpts\":[\"...\"],\"interpretation\":\"...\",\"toneHint\":\"...\"}\n\
引用は与えられたものをそのまま返し、新しい引用を作らないでください。";
	let excerpt_sheet = if excerpts.is_empty() {
		"（引用なし）".to_string()
	} else {
		excerpts.iter().map(|e| format!("- {e}")).collect::<Vec<_>>().join("\n")
	};
	let user = format!(
		"診断要約:\n{summary}\n\n引用:\n{excerpt_sheet}\n\n参考語彙:\n{}\n\n\
条件:\n\
- 引用の内容を断定せず、解釈として差し出す\n\
- interpretationは150字以内\n\
- JSON以外のテキストを出力しない",
		candidate_sheet(candidates),
	);

	vec![ChatMessage::system(system), ChatMessage::user(user)]
}

fn score_sheet(scores: &AxisScores) -> String {
	scores
		.iter()
		.map(|(axis, value)| format!("{}: {value:.2}", axis.as_str()))
		.collect::<Vec<_>>()
		.join(", ")
}

fn candidate_sheet(candidates: &[LoveWord]) -> String {
	candidates
		.iter()
		.enumerate()
		.map(|(index, word)| {
			let mut lines = vec![
				format!("#{} {} ({})", index + 1, word.term, word.lang),
				format!("定義: {}", word.gloss),
			];

			if !word.tags.is_empty() {
				lines.push(format!("タグ: {}", word.tags.join(", ")));
			}
			if let Some(note) = word.culture_note.as_deref() {
				lines.push(format!("文化ノート: {note}"));
			}

			lines.join("\n")
		})
		.collect::<Vec<_>>()
		.join("\n\n")
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::BTreeMap;

	fn sample_word() -> LoveWord {
		LoveWord {
			id: "pt-saudade".to_string(),
			term: "saudade".to_string(),
			lang: "pt".to_string(),
			gloss: "不在の人への甘い郷愁".to_string(),
			tags: vec!["郷愁".to_string()],
			culture_note: Some("ファドの中心的主題。".to_string()),
		}
	}

	#[test]
	fn analyzer_prompt_lists_every_axis() {
		let messages = analyzer("テスト入力");
		assert_eq!(messages.len(), 2);
		for axis in LoveAxis::ALL {
			assert!(messages[1].content.contains(axis.as_str()));
		}
	}

	#[test]
	fn matcher_prompt_renders_scores_with_two_decimals() {
		let scores: AxisScores = BTreeMap::from([(LoveAxis::Passion, 0.679)]);
		let messages = matcher("要約", &scores, &[sample_word()]);
		assert!(messages[1].content.contains("passion: 0.68"));
		assert!(messages[1].content.contains("#1 saudade (pt)"));
		assert!(messages[1].content.contains("文化ノート"));
	}

	#[test]
	fn reflection_prompt_carries_the_excerpts() {
		let excerpts = vec!["静かな夜に手紙を書いた。".to_string()];
		let messages = reflection("要約", &excerpts, &[sample_word()]);
		assert!(messages[1].content.contains("静かな夜に手紙を書いた。"));
	}
}
