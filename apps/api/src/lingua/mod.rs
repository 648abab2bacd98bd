//! Language hub: one translation challenge with vocabulary per day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lingua::prompts::{ATTEMPT_PROMPT, SESSION_PROMPT};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::AiGateway;
use crate::models::profile::{LinguaSession, VocabularyEntry};
use crate::persistence::device::{daily_key, DeviceStore, DAILY_CACHE_TTL};

pub mod handlers;
pub mod prompts;

pub const DEFAULT_LANGUAGE: &str = "Spanish";
const SESSION_SLOT: &str = "lingua";

const FALLBACK_CHALLENGE: &str =
    "I study computer science every day because I want to become a software engineer.";

/// (language, reference translation, [(word, meaning, example)])
type FallbackEntry = (&'static str, &'static str, &'static [(&'static str, &'static str, &'static str)]);

const FALLBACKS: &[FallbackEntry] = &[
    (
        "Spanish",
        "Estudio informática todos los días porque quiero ser ingeniero de software.",
        &[
            ("estudiar", "to study", "Me gusta estudiar por la mañana."),
            ("todos los días", "every day", "Programo todos los días."),
            ("ingeniero", "engineer", "Ella es ingeniera de datos."),
            ("querer", "to want", "Quiero aprender Rust."),
        ],
    ),
    (
        "French",
        "J'étudie l'informatique tous les jours parce que je veux devenir ingénieur logiciel.",
        &[
            ("étudier", "to study", "J'aime étudier le soir."),
            ("tous les jours", "every day", "Je code tous les jours."),
            ("devenir", "to become", "Il veut devenir chercheur."),
            ("logiciel", "software", "Ce logiciel est rapide."),
        ],
    ),
    (
        "German",
        "Ich studiere jeden Tag Informatik, weil ich Softwareentwickler werden möchte.",
        &[
            ("studieren", "to study", "Ich studiere in Berlin."),
            ("jeden Tag", "every day", "Ich lerne jeden Tag."),
            ("werden", "to become", "Sie möchte Ingenieurin werden."),
            ("weil", "because", "Ich bleibe zu Hause, weil es regnet."),
        ],
    ),
];

/// Fixed session used when the model is unavailable.
pub fn fallback_session(language: &str, date: NaiveDate) -> LinguaSession {
    let entry = FALLBACKS
        .iter()
        .find(|(name, _, _)| name.eq_ignore_ascii_case(language));
    let (reference, vocabulary) = match entry {
        Some((_, reference, words)) => (
            reference.to_string(),
            words
                .iter()
                .map(|(word, meaning, example)| VocabularyEntry {
                    word: word.to_string(),
                    meaning: meaning.to_string(),
                    example: example.to_string(),
                })
                .collect(),
        ),
        None => (String::new(), Vec::new()),
    };
    LinguaSession {
        date,
        language: language.to_string(),
        challenge: FALLBACK_CHALLENGE.to_string(),
        reference_answer: reference,
        vocabulary,
        last_attempt: None,
        feedback: None,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedSession {
    challenge: String,
    reference_answer: String,
    #[serde(default)]
    vocabulary: Vec<VocabularyEntry>,
}

pub async fn generate_session(ai: &AiGateway, language: &str, date: NaiveDate) -> LinguaSession {
    let prompt = SESSION_PROMPT.replace("{language}", language);
    match ai
        .generate_json::<GeneratedSession>("lingua.session", &prompt, Some(JSON_ONLY_SYSTEM))
        .await
    {
        Ok(generated) if !generated.challenge.trim().is_empty() => LinguaSession {
            date,
            language: language.to_string(),
            challenge: generated.challenge,
            reference_answer: generated.reference_answer,
            vocabulary: generated.vocabulary,
            last_attempt: None,
            feedback: None,
        },
        _ => fallback_session(language, date),
    }
}

pub fn session_key(username_key: &str, date: NaiveDate) -> String {
    daily_key(username_key, SESSION_SLOT, date)
}

fn is_current(session: &LinguaSession, language: &str, date: NaiveDate) -> bool {
    session.date == date && session.language.eq_ignore_ascii_case(language)
}

/// Today's session: the profile's copy if it is current, else the device
/// cache, else a fresh one. The result is always written back to the cache.
pub async fn todays_session(
    ai: &AiGateway,
    device: &dyn DeviceStore,
    username_key: &str,
    from_profile: Option<LinguaSession>,
    language: &str,
    date: NaiveDate,
) -> LinguaSession {
    let key = session_key(username_key, date);

    if let Some(session) = from_profile.filter(|s| is_current(s, language, date)) {
        return session;
    }

    if let Ok(Some(cached)) = device.get_json::<LinguaSession>(&key).await {
        if is_current(&cached, language, date) {
            debug!("Language session for {username_key} served from cache");
            return cached;
        }
    }

    let session = generate_session(ai, language, date).await;
    device.remember(&key, &session, Some(DAILY_CACHE_TTL)).await;
    session
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptVerdict {
    pub correct: bool,
    pub feedback: String,
    #[serde(default)]
    pub fallback: bool,
}

/// Grades a translation. Gateway failure accepts the attempt.
pub async fn evaluate_attempt(
    ai: &AiGateway,
    session: &LinguaSession,
    attempt: &str,
) -> AttemptVerdict {
    let prompt = ATTEMPT_PROMPT
        .replace("{language}", &session.language)
        .replace("{challenge}", &session.challenge)
        .replace("{reference}", &session.reference_answer)
        .replace("{attempt}", attempt);

    match ai
        .generate_json::<AttemptVerdict>("lingua.attempt", &prompt, Some(JSON_ONLY_SYSTEM))
        .await
    {
        Ok(verdict) => AttemptVerdict {
            fallback: false,
            ..verdict
        },
        Err(_) => AttemptVerdict {
            correct: true,
            feedback: format!(
                "Automatic checking is offline. Compare with the reference: {}",
                session.reference_answer
            ),
            fallback: true,
        },
    }
}

/// Records the attempt and its feedback on the session.
pub fn record_attempt(session: &mut LinguaSession, attempt: &str, verdict: &AttemptVerdict) {
    session.last_attempt = Some(attempt.to_string());
    session.feedback = Some(verdict.feedback.clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::{gateway, ScriptedModel};
    use crate::persistence::memory::MemoryDeviceStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    const GENERATED: &str = r#"{"challenge": "I fixed the bug.", "referenceAnswer": "Arreglé el error.",
        "vocabulary": [{"word": "error", "meaning": "bug", "example": "Hay un error."}]}"#;

    #[test]
    fn test_fallback_session_known_and_unknown_language() {
        let spanish = fallback_session("spanish", day(1));
        assert!(!spanish.reference_answer.is_empty());
        assert!(!spanish.vocabulary.is_empty());

        let klingon = fallback_session("Klingon", day(1));
        assert_eq!(klingon.challenge, FALLBACK_CHALLENGE);
        assert!(klingon.vocabulary.is_empty());
    }

    #[tokio::test]
    async fn test_profile_session_for_today_is_reused() {
        let model = ScriptedModel::replying(vec![]);
        let ai = gateway(model.clone());
        let device = MemoryDeviceStore::default();
        let existing = fallback_session(DEFAULT_LANGUAGE, day(18));

        let session =
            todays_session(&ai, &device, "bob", Some(existing.clone()), DEFAULT_LANGUAGE, day(18)).await;
        assert_eq!(session, existing);
        assert_eq!(model.prompt_count(), 0);
    }

    #[tokio::test]
    async fn test_stale_session_regenerates_and_caches() {
        let model = ScriptedModel::replying(vec![Ok(GENERATED)]);
        let ai = gateway(model.clone());
        let device = MemoryDeviceStore::default();
        let yesterday = fallback_session(DEFAULT_LANGUAGE, day(17));

        let session =
            todays_session(&ai, &device, "bob", Some(yesterday), DEFAULT_LANGUAGE, day(18)).await;
        assert_eq!(session.date, day(18));
        assert_eq!(session.challenge, "I fixed the bug.");
        assert!(device.raw(&session_key("bob", day(18))).is_some());

        // Second call hits the cache, not the model.
        let again = todays_session(&ai, &device, "bob", None, DEFAULT_LANGUAGE, day(18)).await;
        assert_eq!(again, session);
        assert_eq!(model.prompt_count(), 1);
    }

    #[tokio::test]
    async fn test_outage_yields_fallback_session() {
        let ai = gateway(ScriptedModel::replying(vec![Err("down")]));
        let device = MemoryDeviceStore::default();
        let session = todays_session(&ai, &device, "bob", None, "German", day(18)).await;
        assert_eq!(session, fallback_session("German", day(18)));
    }

    #[tokio::test]
    async fn test_attempt_outage_accepts() {
        let ai = gateway(ScriptedModel::replying(vec![Err("down")]));
        let session = fallback_session(DEFAULT_LANGUAGE, day(18));
        let verdict = evaluate_attempt(&ai, &session, "Estudio mucho").await;
        assert!(verdict.correct);
        assert!(verdict.fallback);
    }

    #[tokio::test]
    async fn test_attempt_is_recorded() {
        let ai = gateway(ScriptedModel::replying(vec![Ok(
            r#"{"correct": false, "feedback": "Use 'ser' here."}"#,
        )]));
        let mut session = fallback_session(DEFAULT_LANGUAGE, day(18));
        let verdict = evaluate_attempt(&ai, &session, "Estoy ingeniero").await;
        assert!(!verdict.correct);
        record_attempt(&mut session, "Estoy ingeniero", &verdict);
        assert_eq!(session.last_attempt.as_deref(), Some("Estoy ingeniero"));
        assert_eq!(session.feedback.as_deref(), Some("Use 'ser' here."));
    }
}
