// Prompt templates for the coaching features.

pub const FLASHCARDS_PROMPT: &str = r#"Create between 3 and 8 study flashcards for this roadmap item:

{item}

Each card tests one idea. Fronts are short questions; backs are answers of
at most two sentences.

Return a JSON array:
[{"front": "...", "back": "..."}]"#;

pub const INTERVIEW_QUESTION_PROMPT: &str = r#"You are interviewing a candidate for a {role} position.
{topic}
Ask ONE realistic interview question of medium difficulty, the kind asked at
a strong product company. Return only the question text."#;

pub const INTERVIEW_EVALUATE_PROMPT: &str = r#"You are a hiring manager for a {role} position.

QUESTION:
{question}

CANDIDATE ANSWER:
{answer}

Score the answer from 0 to 10, give specific feedback, and write an improved
version of the answer.

Return exactly:
{"score": 0-10, "feedback": "...", "improvedAnswer": "..."}"#;

pub const RESUME_BULLETS_PROMPT: &str = r#"Write resume bullet points for a computer science student{role}.
Use only the completed work listed below. One bullet per item, starting with a
strong past-tense verb, under 25 words, no invented metrics.

COMPLETED WORK:
{items}

Return a JSON array of strings."#;

pub const BRIEFING_PROMPT: &str = r#"Write a short morning briefing (3-4 sentences) for a student.

Today is {date}.
In progress: {in_progress}
Next high-priority items: {high_priority}

Point out what to focus on today and end with one line of encouragement.
Plain text, no lists, no markdown."#;

pub const TRENDS_PROMPT: &str = r#"Search for current hiring demand for {role} roles and list the
5 skills employers ask for most right now.

Return a JSON array only:
[{"skill": "...", "demand": "high" | "medium" | "low", "note": "one sentence"}]"#;
