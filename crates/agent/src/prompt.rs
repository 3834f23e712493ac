//! Instruction assembly.
//!
//! Every reasoning step starts from the same ordered instruction set: the
//! persona with its tool guidance, the kitchen glossary, a handful of
//! example exchanges, and, only when the session has any, a clause naming
//! the active dietary restrictions. Assembly is a pure function of the
//! persona text and the restriction set.

use chefai_core::dietary::DietaryRestrictionSet;
use chefai_core::message::{Message, Role};
use serde::Serialize;

const DEFAULT_PERSONA: &str = "You are 'ChefAI', a friendly and knowledgeable AI kitchen assistant. \
You specialize in helping users manage their kitchen ingredients and generate personalized recipe \
suggestions. Give short, clear answers to questions about kitchen inventory, food preparation and \
recipes: a few sentences that contain the most important information and answer the question \
directly. Stay within cooking, kitchen management and recipe recommendations.";

const TOOL_GUIDANCE: &str = "Use recipe_search to look up recipes and cooking information in the \
recipe database before answering recipe questions. Use web_search only when the database has \
nothing relevant or the user needs current information. If the user asks you to propose a recipe, \
use retrieve_history to get the user's recent searches and base the proposal on them. When the \
user states new dietary restrictions, call set_dietary_restrictions with the complete list.";

const GLOSSARY: &str = "Below is the glossary of terms related to kitchen management and recipe suggestions:

1. Ingredient Tracker: A system that monitors the ingredients available in the user\u{2019}s kitchen, including quantities and expiration dates.
2. Expiration Alerts: Notifications sent to the user when an ingredient is close to its expiration date, prompting them to use it in a recipe.
3. Recipe Database: A collection of recipes that the AI chef uses to generate meal suggestions for users.
4. Substitution: A suggested alternative ingredient when the user is missing a key component of a recipe.
5. Dietary Preferences: User-specified dietary restrictions or preferences, such as vegan, gluten-free, or low-carb, which the AI chef takes into account when generating recipes.
6. Personalized Recipe Suggestions: Recipes tailored to the user\u{2019}s tastes, cooking habits, and available ingredients.
7. Food Waste Reduction: A feature that helps users minimize waste by suggesting recipes that use ingredients before they expire.
8. Optical Character Recognition (OCR): A feature that allows users to scan handwritten or printed recipes and add them to their personal recipe collection in the app.
9. Web Scraping: A method of extracting recipe data from websites by inputting a URL, allowing users to save and organize recipes from the web.
10. Meal Planning: The process of organizing meals for upcoming days or weeks based on available ingredients and dietary preferences.
11. Feedback Loop: A system where the AI chef learns from the user\u{2019}s recipe choices and feedback, improving future suggestions.
12. Nutritional Information: Data about the calories, macronutrients, and micronutrients in a recipe, which can be displayed to help users make informed dietary decisions.
13. Shopping List: A feature that generates a list of missing ingredients for a chosen recipe, helping users with their grocery shopping.
14. Favorite Recipes: A collection of recipes that users have marked as favorites, helping the AI chef prioritize similar suggestions in the future.";

/// Example exchanges that steer length and tone.
const EXEMPLARS: [(&str, &str); 5] = [
    (
        "How does the AI chef generate recipes using the ingredients in my kitchen?",
        "The AI chef uses a combination of ingredient-based filtering and recipe databases to generate meal suggestions. It checks the available ingredients in your kitchen, suggests recipes that use as many of those ingredients as possible, and provides options to customize them. If certain ingredients are missing, the AI can recommend suitable substitutions.",
    ),
    (
        "Can the AI chef recommend a recipe based on my dietary preferences?",
        "Yes! The AI chef takes into account your dietary preferences, such as vegan, gluten-free, or low-carb, when generating recipe suggestions. It ensures the recipes meet your requirements by filtering out unsuitable ingredients and suggesting alternatives if necessary.",
    ),
    (
        "What happens if one of my ingredients is about to expire?",
        "When an ingredient is nearing its expiration date, the app will notify you and recommend recipes that can use that ingredient. This helps minimize food waste by suggesting ways to incorporate soon-to-expire ingredients into your meals.",
    ),
    (
        "How does the AI improve its recipe recommendations over time?",
        "The AI learns from your feedback, favorite recipes, and cooking habits. By tracking the recipes you\u{2019}ve enjoyed and the ingredients you commonly use, the AI refines its suggestions, making them more personalized and relevant to your preferences.",
    ),
    (
        "Can I save my own recipes in the app?",
        "Absolutely! You can save your own recipes by manually inputting them, using a photo upload feature where the app extracts the text using Optical Character Recognition (OCR), or by scraping recipes from the web with a URL.",
    ),
];

/// One role-tagged piece of the instruction set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub role: Role,
    pub content: String,
}

impl Instruction {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Ordered instructions prepended to the conversation on every step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstructionSet(Vec<Instruction>);

impl InstructionSet {
    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert to provider messages, preserving order.
    pub fn to_messages(&self) -> Vec<Message> {
        self.0
            .iter()
            .map(|i| match i.role {
                Role::User => Message::user(&i.content),
                Role::Assistant => Message::assistant(&i.content),
                _ => Message::system(&i.content),
            })
            .collect()
    }
}

/// Builds the [`InstructionSet`] for a given restriction set.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    persona: String,
}

impl PromptAssembler {
    pub fn new() -> Self {
        Self {
            persona: DEFAULT_PERSONA.to_string(),
        }
    }

    /// Replace the persona statement. Tool guidance, glossary and exemplars
    /// are kept.
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    pub fn assemble(&self, restrictions: &DietaryRestrictionSet) -> InstructionSet {
        let mut instructions = vec![
            Instruction::system(self.persona.clone()),
            Instruction::system(TOOL_GUIDANCE),
            Instruction::system(GLOSSARY),
        ];

        for (question, answer) in EXEMPLARS {
            instructions.push(Instruction {
                role: Role::User,
                content: question.to_string(),
            });
            instructions.push(Instruction {
                role: Role::Assistant,
                content: answer.to_string(),
            });
        }

        if !restrictions.is_empty() {
            instructions.push(Instruction::system(restriction_clause(restrictions)));
        }

        InstructionSet(instructions)
    }
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new()
    }
}

fn restriction_clause(restrictions: &DietaryRestrictionSet) -> String {
    format!(
        "IMPORTANT: The user has these dietary restrictions: {}. You MUST adapt all recipes to \
         accommodate them. Every recipe you suggest has to satisfy all of these restrictions at \
         the same time; replace or leave out any ingredient that violates one of them.",
        restrictions.joined()
    )
}
