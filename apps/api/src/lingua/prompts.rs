// Language hub prompt templates.

pub const SESSION_PROMPT: &str = r#"Create today's {language} practice for a computer science student
at an intermediate level.

1. One English sentence about studying, programming or careers to translate
   into {language}.
2. The reference {language} translation.
3. Five useful {language} vocabulary words related to the sentence.

Return exactly:
{"challenge": "English sentence", "referenceAnswer": "...",
 "vocabulary": [{"word": "...", "meaning": "English meaning", "example": "short {language} sentence"}]}"#;

pub const ATTEMPT_PROMPT: &str = r#"A student translated an English sentence into {language}.

ENGLISH:
{challenge}

REFERENCE TRANSLATION:
{reference}

STUDENT TRANSLATION:
{attempt}

Judge meaning first, grammar second. Small word-order or synonym differences
are fine. Give brief, kind feedback that names any mistake.

Return exactly:
{"correct": true | false, "feedback": "..."}"#;
