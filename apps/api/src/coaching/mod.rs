//! Model-backed coaching: flashcards, mock interviews, resume bullets,
//! the daily briefing and market trends.
//!
//! Every function here returns something usable. Gateway failures are
//! already logged by `AiGateway`; this layer only swaps in fallbacks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::coaching::prompts::{
    BRIEFING_PROMPT, FLASHCARDS_PROMPT, INTERVIEW_EVALUATE_PROMPT, INTERVIEW_QUESTION_PROMPT,
    RESUME_BULLETS_PROMPT, TRENDS_PROMPT,
};
use crate::llm_client::prompts::{describe_item, JSON_ONLY_SYSTEM, MENTOR_SYSTEM};
use crate::llm_client::AiGateway;
use crate::models::roadmap::{Priority, RoadmapItem, Role, Status};

pub mod handlers;
pub mod prompts;

const MIN_FLASHCARDS: usize = 3;
const MAX_FLASHCARDS: usize = 8;

// ─── Flashcards ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

pub async fn flashcards(ai: &AiGateway, item: &RoadmapItem) -> Vec<Flashcard> {
    let prompt = FLASHCARDS_PROMPT.replace("{item}", &describe_item(item));
    let cards: Vec<Flashcard> = ai
        .generate_json("coaching.flashcards", &prompt, Some(JSON_ONLY_SYSTEM))
        .await
        .unwrap_or_default();

    let mut cards: Vec<Flashcard> = cards
        .into_iter()
        .filter(|c| !c.front.trim().is_empty() && !c.back.trim().is_empty())
        .collect();
    if cards.is_empty() {
        return stock_cards(item).into_iter().take(1).collect();
    }
    if cards.len() < MIN_FLASHCARDS {
        for card in stock_cards(item) {
            if cards.len() == MIN_FLASHCARDS {
                break;
            }
            if cards.iter().all(|c| c.front != card.front) {
                cards.push(card);
            }
        }
    }
    cards.truncate(MAX_FLASHCARDS);
    cards
}

/// Cards built from the item itself, most useful first.
fn stock_cards(item: &RoadmapItem) -> Vec<Flashcard> {
    vec![
        Flashcard {
            front: format!("What is {} about?", item.name),
            back: item.description.clone(),
        },
        Flashcard {
            front: format!("Which year of the roadmap covers {}?", item.name),
            back: format!("Year {}", item.year),
        },
        Flashcard {
            front: format!("Where can you study {}?", item.name),
            back: item
                .resource_name
                .clone()
                .unwrap_or_else(|| "Any well-reviewed course or textbook on the topic".to_string()),
        },
    ]
}

// ─── Interview ──────────────────────────────────────────────────────────────

fn fallback_questions(role: Role) -> &'static [&'static str] {
    match role {
        Role::Sde => &[
            "Design a URL shortener. How would you generate keys and scale reads?",
            "Explain the difference between a process and a thread, with an example of when you would pick each.",
            "How would you find the first non-repeating character in a stream?",
        ],
        Role::MlEngineer => &[
            "How would you detect and handle data drift for a model in production?",
            "Walk me through deploying a model behind a low-latency API.",
            "What causes vanishing gradients and how do you mitigate them?",
        ],
        Role::DataScientist => &[
            "How would you design an A/B test for a new checkout flow?",
            "Explain the bias-variance trade-off using a model you have trained.",
            "How do you handle missing data in a dataset you are about to model?",
        ],
        Role::AllRoles => &[
            "Tell me about a project you are proud of and the hardest bug you hit in it.",
            "Describe a time you had to learn a new technology quickly.",
        ],
    }
}

/// Canned question for `role`; `seed` rotates through the list.
pub fn fallback_question(role: Role, seed: usize) -> String {
    let questions = fallback_questions(role);
    questions[seed % questions.len()].to_string()
}

pub async fn interview_question(
    ai: &AiGateway,
    role: Role,
    topic: Option<&str>,
    seed: usize,
) -> String {
    let topic_line = match topic.map(str::trim).filter(|t| !t.is_empty()) {
        Some(topic) => format!("Focus the question on: {topic}\n"),
        None => String::new(),
    };
    let prompt = INTERVIEW_QUESTION_PROMPT
        .replace("{role}", role.label())
        .replace("{topic}", &topic_line);

    match ai
        .generate_text("coaching.interview_question", &prompt, Some(MENTOR_SYSTEM))
        .await
    {
        Ok(question) if !question.is_empty() => question,
        _ => fallback_question(role, seed),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewFeedback {
    /// 0-10; `None` when the model could not grade the answer.
    pub score: Option<u8>,
    pub feedback: String,
    #[serde(default)]
    pub improved_answer: String,
}

pub async fn evaluate_interview(
    ai: &AiGateway,
    role: Role,
    question: &str,
    answer: &str,
) -> InterviewFeedback {
    let prompt = INTERVIEW_EVALUATE_PROMPT
        .replace("{role}", role.label())
        .replace("{question}", question)
        .replace("{answer}", answer);

    match ai
        .generate_json::<InterviewFeedback>("coaching.interview_evaluate", &prompt, Some(JSON_ONLY_SYSTEM))
        .await
    {
        Ok(mut feedback) => {
            feedback.score = feedback.score.map(|s| s.min(10));
            feedback
        }
        Err(_) => InterviewFeedback {
            score: None,
            feedback: "Automatic grading is unavailable right now. Compare your answer \
                       against the question: is it structured, concrete and backed by an example?"
                .to_string(),
            improved_answer: String::new(),
        },
    }
}

// ─── Resume bullets ─────────────────────────────────────────────────────────

/// Completed project and output items, the raw material for resume bullets.
pub fn completed_outputs(roadmap: &[RoadmapItem]) -> Vec<RoadmapItem> {
    roadmap
        .iter()
        .filter(|i| i.is_completed() && (i.is_project || i.is_output))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumeBullets {
    pub bullets: Vec<String>,
    pub fallback: bool,
}

pub async fn resume_bullets(
    ai: &AiGateway,
    items: &[RoadmapItem],
    role: Option<Role>,
) -> ResumeBullets {
    let listing = items
        .iter()
        .map(|i| format!("- {}: {}", i.name, i.description))
        .collect::<Vec<_>>()
        .join("\n");
    let role_clause = role
        .map(|r| format!(" applying for {} roles", r.label()))
        .unwrap_or_default();
    let prompt = RESUME_BULLETS_PROMPT
        .replace("{role}", &role_clause)
        .replace("{items}", &listing);

    match ai
        .generate_json::<Vec<String>>("coaching.resume_bullets", &prompt, Some(JSON_ONLY_SYSTEM))
        .await
    {
        Ok(bullets) if !bullets.is_empty() => ResumeBullets {
            bullets,
            fallback: false,
        },
        _ => ResumeBullets {
            bullets: items
                .iter()
                .map(|i| format!("Built {}: {}", i.name, i.description))
                .collect(),
            fallback: true,
        },
    }
}

// ─── Daily briefing ─────────────────────────────────────────────────────────

fn names<'a>(items: impl Iterator<Item = &'a RoadmapItem>, limit: usize) -> String {
    let listed: Vec<&str> = items.take(limit).map(|i| i.name.as_str()).collect();
    if listed.is_empty() {
        "nothing yet".to_string()
    } else {
        listed.join(", ")
    }
}

pub async fn daily_briefing(ai: &AiGateway, roadmap: &[RoadmapItem], today: NaiveDate) -> String {
    let in_progress = names(
        roadmap.iter().filter(|i| i.status == Status::InProgress),
        5,
    );
    let high_priority = names(
        roadmap
            .iter()
            .filter(|i| i.priority == Priority::High && !i.is_completed()),
        3,
    );
    let prompt = BRIEFING_PROMPT
        .replace("{date}", &today.format("%A, %B %-d").to_string())
        .replace("{in_progress}", &in_progress)
        .replace("{high_priority}", &high_priority);

    match ai
        .generate_text("coaching.briefing", &prompt, Some(MENTOR_SYSTEM))
        .await
    {
        Ok(text) if !text.is_empty() => text,
        _ => format!(
            "Today, keep moving on: {in_progress}. Next up at high priority: {high_priority}. \
             Small steps every day add up."
        ),
    }
}

// ─── Market trends ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trend {
    pub skill: String,
    pub demand: String,
    #[serde(default)]
    pub note: String,
}

fn fallback_trends() -> Vec<Trend> {
    [
        ("Python", "high", "Still the default language for data and ML work."),
        ("Cloud platforms", "high", "AWS, GCP or Azure experience appears in most listings."),
        ("System design", "high", "Expected from mid-level interviews onwards."),
        ("SQL", "medium", "Asked for across engineering and analytics roles."),
        ("LLM application development", "medium", "Growing demand for RAG and agent tooling."),
    ]
    .into_iter()
    .map(|(skill, demand, note)| Trend {
        skill: skill.to_string(),
        demand: demand.to_string(),
        note: note.to_string(),
    })
    .collect()
}

/// Search-grounded skill demand for `role`, or a fixed list when offline.
pub async fn market_trends(ai: &AiGateway, role: Role) -> (Vec<Trend>, bool) {
    let prompt = TRENDS_PROMPT.replace("{role}", role.label());
    match ai
        .generate_grounded_json::<Vec<Trend>>("coaching.trends", &prompt, None)
        .await
    {
        Ok(trends) if !trends.is_empty() => (trends, false),
        _ => (fallback_trends(), true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::roadmap::roadmap_catalog;
    use crate::llm_client::testing::{gateway, ScriptedModel};

    fn item() -> RoadmapItem {
        roadmap_catalog().into_iter().next().unwrap()
    }

    #[tokio::test]
    async fn test_flashcards_parse_and_cap() {
        let cards: Vec<String> = (0..10)
            .map(|i| format!(r#"{{"front": "Q{i}", "back": "A{i}"}}"#))
            .collect();
        let reply = format!("```json\n[{}]\n```", cards.join(","));
        let ai = gateway(ScriptedModel::replying(vec![Ok(reply.as_str())]));
        let cards = flashcards(&ai, &item()).await;
        assert_eq!(cards.len(), MAX_FLASHCARDS);
        assert_eq!(cards[0].front, "Q0");
    }

    #[tokio::test]
    async fn test_short_flashcard_reply_is_padded_to_minimum() {
        let reply = r#"[{"front": "Why amortize?", "back": "Spread cost"}, {"front": " ", "back": "x"}]"#;
        let ai = gateway(ScriptedModel::replying(vec![Ok(reply)]));
        let item = item();
        let cards = flashcards(&ai, &item).await;
        assert_eq!(cards.len(), MIN_FLASHCARDS);
        assert_eq!(cards[0].front, "Why amortize?");
        assert_eq!(cards[1].back, item.description);
    }

    #[tokio::test]
    async fn test_flashcards_fallback_is_single_card() {
        let ai = gateway(ScriptedModel::replying(vec![Err("down")]));
        let item = item();
        let cards = flashcards(&ai, &item).await;
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].back, item.description);
    }

    #[tokio::test]
    async fn test_interview_question_falls_back_by_role() {
        let ai = gateway(ScriptedModel::replying(vec![Err("down")]));
        let q = interview_question(&ai, Role::DataScientist, None, 0).await;
        assert_eq!(q, fallback_question(Role::DataScientist, 0));
    }

    #[test]
    fn test_fallback_question_rotates() {
        assert_ne!(fallback_question(Role::Sde, 0), fallback_question(Role::Sde, 1));
        assert_eq!(fallback_question(Role::Sde, 0), fallback_question(Role::Sde, 3));
    }

    #[tokio::test]
    async fn test_interview_evaluation_clamps_score() {
        let ai = gateway(ScriptedModel::replying(vec![Ok(
            r#"{"score": 14, "feedback": "Great", "improvedAnswer": "..."}"#,
        )]));
        let feedback = evaluate_interview(&ai, Role::Sde, "q", "a").await;
        assert_eq!(feedback.score, Some(10));
    }

    #[tokio::test]
    async fn test_interview_evaluation_fallback_has_no_score() {
        let ai = gateway(ScriptedModel::replying(vec![Ok("not json")]));
        let feedback = evaluate_interview(&ai, Role::Sde, "q", "a").await;
        assert_eq!(feedback.score, None);
        assert!(!feedback.feedback.is_empty());
    }

    #[test]
    fn test_completed_outputs_picks_finished_projects_only() {
        let mut roadmap = roadmap_catalog();
        assert!(completed_outputs(&roadmap).is_empty());
        let project = roadmap.iter_mut().find(|i| i.is_project).unwrap();
        project.status = Status::Completed;
        let id = project.id.clone();
        let picked = completed_outputs(&roadmap);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].id, id);
    }

    #[tokio::test]
    async fn test_resume_bullets_fallback_templates() {
        let ai = gateway(ScriptedModel::replying(vec![Err("down")]));
        let items = vec![item()];
        let result = resume_bullets(&ai, &items, Some(Role::Sde)).await;
        assert!(result.fallback);
        assert!(result.bullets[0].contains(&items[0].name));
    }

    #[tokio::test]
    async fn test_briefing_falls_back_to_listing() {
        let ai = gateway(ScriptedModel::replying(vec![Err("down")]));
        let mut roadmap = roadmap_catalog();
        roadmap[0].status = Status::InProgress;
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let text = daily_briefing(&ai, &roadmap, today).await;
        assert!(text.contains(&roadmap[0].name));
    }

    #[tokio::test]
    async fn test_trends_use_grounded_reply() {
        let model = ScriptedModel::replying(vec![Ok(
            r#"Based on search: [{"skill": "Rust", "demand": "medium", "note": "Systems roles"}]"#,
        )]);
        let ai = gateway(model.clone());
        let (trends, fallback) = market_trends(&ai, Role::Sde).await;
        assert!(!fallback);
        assert_eq!(trends[0].skill, "Rust");
        assert_eq!(model.prompt_count(), 1);
    }

    #[tokio::test]
    async fn test_trends_fallback_when_offline() {
        let ai = AiGateway::new(None);
        let (trends, fallback) = market_trends(&ai, Role::MlEngineer).await;
        assert!(fallback);
        assert_eq!(trends.len(), 5);
    }
}
