use storage::repository::QuestionRepository;
use trivia_core::model::{Difficulty, Question, QuestionId};

struct DemoQuestion {
    id: &'static str,
    text: &'static str,
    options: [&'static str; 4],
    answer: &'static str,
    category: &'static str,
    subcategories: &'static [&'static str],
    difficulty: Option<&'static str>,
}

const DEMO_QUESTIONS: &[DemoQuestion] = &[
    DemoQuestion {
        id: "demo-uefa-e1",
        text: "Which country won UEFA Euro 2016?",
        options: ["Portugal", "France", "Germany", "Spain"],
        answer: "Portugal",
        category: "International",
        subcategories: &["UEFA"],
        difficulty: Some("easy"),
    },
    DemoQuestion {
        id: "demo-uefa-e2",
        text: "Which country co-hosted UEFA Euro 2012 with Poland?",
        options: ["Ukraine", "Russia", "Czech Republic", "Belarus"],
        answer: "Ukraine",
        category: "International",
        subcategories: &["UEFA"],
        difficulty: Some("easy"),
    },
    DemoQuestion {
        id: "demo-uefa-e3",
        text: "Which country won UEFA Euro 2020, played in 2021?",
        options: ["Italy", "England", "Spain", "Denmark"],
        answer: "Italy",
        category: "International",
        subcategories: &["UEFA"],
        difficulty: Some("easy"),
    },
    DemoQuestion {
        id: "demo-uefa-e4",
        text: "Which country won UEFA Euro 2008?",
        options: ["Spain", "Germany", "Russia", "Turkey"],
        answer: "Spain",
        category: "International",
        subcategories: &["UEFA"],
        difficulty: Some("easy"),
    },
    DemoQuestion {
        id: "demo-uefa-e5",
        text: "Which outsider won UEFA Euro 2004?",
        options: ["Greece", "Portugal", "Czech Republic", "Netherlands"],
        answer: "Greece",
        category: "International",
        subcategories: &["UEFA"],
        difficulty: Some("easy"),
    },
    DemoQuestion {
        id: "demo-uefa-e6",
        text: "Which country won UEFA Euro 2024?",
        options: ["Spain", "England", "France", "Netherlands"],
        answer: "Spain",
        category: "International",
        subcategories: &["UEFA"],
        difficulty: Some("easy"),
    },
    DemoQuestion {
        id: "demo-uefa-h1",
        text: "Who won the first European Championship in 1960?",
        options: ["Soviet Union", "Yugoslavia", "Spain", "France"],
        answer: "Soviet Union",
        category: "International",
        subcategories: &["UEFA"],
        difficulty: Some("hard"),
    },
    DemoQuestion {
        id: "demo-uefa-h2",
        text: "Which late replacement for Yugoslavia won Euro 1992?",
        options: ["Denmark", "Germany", "Sweden", "Netherlands"],
        answer: "Denmark",
        category: "International",
        subcategories: &["UEFA"],
        difficulty: Some("hard"),
    },
    DemoQuestion {
        id: "demo-uefa-h3",
        text: "Who scored the golden goal that won Euro 2000 for France?",
        options: ["David Trezeguet", "Sylvain Wiltord", "Thierry Henry", "Zinedine Zidane"],
        answer: "David Trezeguet",
        category: "International",
        subcategories: &["UEFA"],
        difficulty: Some("hard"),
    },
    DemoQuestion {
        id: "demo-uefa-h4",
        text: "Who scored nine goals to top the Euro 1984 scoring chart?",
        options: ["Michel Platini", "Marco van Basten", "Gerd Muller", "Jean-Pierre Papin"],
        answer: "Michel Platini",
        category: "International",
        subcategories: &["UEFA"],
        difficulty: Some("hard"),
    },
    DemoQuestion {
        id: "demo-uefa-h5",
        text: "Which team won the Euro 1976 final on a chipped penalty?",
        options: ["Czechoslovakia", "West Germany", "Netherlands", "Yugoslavia"],
        answer: "Czechoslovakia",
        category: "International",
        subcategories: &["UEFA"],
        difficulty: Some("hard"),
    },
    DemoQuestion {
        id: "demo-wc-1",
        text: "Which country won the 2010 FIFA World Cup?",
        options: ["Spain", "Netherlands", "Germany", "Uruguay"],
        answer: "Spain",
        category: "International",
        subcategories: &["World Cup"],
        difficulty: None,
    },
    DemoQuestion {
        id: "demo-wc-2",
        text: "Who won the Golden Boot at the 2018 World Cup?",
        options: ["Harry Kane", "Kylian Mbappe", "Romelu Lukaku", "Antoine Griezmann"],
        answer: "Harry Kane",
        category: "International",
        subcategories: &["World Cup"],
        difficulty: None,
    },
    DemoQuestion {
        id: "demo-pl-1",
        text: "Which club went unbeaten through the 2003-04 Premier League season?",
        options: ["Arsenal", "Chelsea", "Manchester United", "Liverpool"],
        answer: "Arsenal",
        category: "Domestic Leagues",
        subcategories: &["Premier League", "2000s"],
        difficulty: None,
    },
    DemoQuestion {
        id: "demo-tr-1",
        text: "Which club sold Neymar to Paris Saint-Germain in 2017?",
        options: ["Barcelona", "Santos", "Real Madrid", "Chelsea"],
        answer: "Barcelona",
        category: "Transfers",
        subcategories: &["Transfer Fees"],
        difficulty: None,
    },
];

impl DemoQuestion {
    fn build(&self) -> Result<Question, trivia_core::Error> {
        let question = Question::new(
            QuestionId::new(self.id),
            self.text,
            self.options.iter().map(|o| (*o).to_owned()).collect(),
            self.answer,
            self.category,
            self.subcategories.iter().map(|s| (*s).to_owned()).collect(),
            Difficulty::from_tag(self.difficulty),
        )?;
        Ok(question)
    }
}

/// Upsert the built-in question set. Returns the number of questions written.
pub async fn insert_demo_questions(
    questions: &dyn QuestionRepository,
) -> Result<usize, Box<dyn std::error::Error>> {
    for demo in DEMO_QUESTIONS {
        questions.upsert_question(&demo.build()?).await?;
    }
    Ok(DEMO_QUESTIONS.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn demo_questions_are_valid_and_unique() {
        let mut ids = HashSet::new();
        let mut texts = HashSet::new();
        for demo in DEMO_QUESTIONS {
            let question = demo.build().unwrap();
            assert!(ids.insert(question.id().clone()));
            assert!(texts.insert(question.text().to_owned()));
        }
    }

    #[test]
    fn demo_set_fills_a_default_uefa_quiz() {
        let uefa = DEMO_QUESTIONS
            .iter()
            .filter(|d| d.subcategories.contains(&"UEFA"))
            .count();
        assert!(uefa >= 10);
    }
}
