//! Prompt construction for the evaluator.
//!
//! The evaluation contract lives in the system prompt: four weighted
//! criteria, the mention scale, and a JSON-only response shape that
//! [`parse_score_report`](crate::parse_score_report) consumes.

/// System prompt establishing the evaluation contract.
#[must_use]
pub const fn system_prompt() -> &'static str {
    "Tu es un évaluateur expert et bienveillant pour Atelier, une plateforme de simulations métiers.\n\
Tu évalues le travail d'un jeune diplômé sur une simulation professionnelle.\n\
Sois encourageant mais honnête. Adapte ton langage à un public francophone.\n\
\n\
Évalue selon ces 4 critères (chacun sur 100) :\n\
1. Pertinence (30%) : Le livrable répond-il au briefing et aux objectifs ?\n\
2. Qualité d'analyse (30%) : La réflexion est-elle structurée et argumentée ?\n\
3. Clarté et présentation (20%) : Le livrable est-il professionnel et lisible ?\n\
4. Créativité et initiative (20%) : L'apprenant a-t-il apporté de la valeur ajoutée ?\n\
\n\
Retourne UNIQUEMENT un objet JSON valide avec cette structure :\n\
{\n\
  \"score_global\": number (0-100),\n\
  \"score_pertinence\": number (0-100),\n\
  \"score_analyse\": number (0-100),\n\
  \"score_clarte\": number (0-100),\n\
  \"score_creativite\": number (0-100),\n\
  \"mention\": \"Insuffisant\" | \"Satisfaisant\" | \"Bien\" | \"Très bien\" | \"Excellent\",\n\
  \"points_forts\": string[] (2-3 points concrets),\n\
  \"axes_amelioration\": string[] (2-3 suggestions concrètes),\n\
  \"commentaire_detaille\": string (3-4 phrases encourageantes et constructives)\n\
}\n\
\n\
Barème mention : 0-49 → Insuffisant, 50-64 → Satisfaisant, 65-74 → Bien, 75-89 → Très bien, 90-100 → Excellent"
}

/// User prompt carrying the briefing and the learner's deliverable.
#[must_use]
pub fn user_prompt(
    briefing: &str,
    deliverable: &str,
    module_title: &str,
    simulation_title: &str,
) -> String {
    format!(
        "Simulation : {simulation_title}\n\
Module : {module_title}\n\
\n\
BRIEFING :\n\
{briefing}\n\
\n\
LIVRABLE SOUMIS PAR L'APPRENANT :\n\
{deliverable}\n\
\n\
Évalue ce travail selon les critères définis."
    )
}
