//! Fixed French instructions sent to the model.
//!
//! Style rules (five-word limit, banned stock openers, closing phrases used
//! once at the end) live only in these texts. Nothing checks the model's
//! output against them.

/// Label placed before retrieved context in the first paragraph.
pub const CONTEXT_LABEL: &str = "Contexte pertinent :";

/// Marker separating the two paragraphs in the final user turn.
pub const TRANSITION_MARKER: &str = "TRANSITION";

/// Phrases reserved for the last transition of an article.
pub const CLOSING_TRANSITIONS: [&str; 11] = [
    "Enfin",
    "Et pour finir",
    "Pour terminer",
    "Pour finir",
    "En guise de conclusion",
    "En conclusion",
    "En guise de mot de la fin",
    "Pour clore cette revue",
    "Pour conclure cette sélection",
    "Dernier point à noter",
    "Pour refermer ce tour d’horizon",
];

pub const TRANSITION_SYSTEM_PROMPT: &str = "Tu es un assistant de presse francophone. \
Ta tâche est d'insérer une transition brève et naturelle (5 mots maximum) \
entre deux paragraphes d'actualité régionale. \
La transition doit être journalistique, fluide, neutre et ne pas répéter les débuts comme 'Par ailleurs' ou 'En parallèle'. \
La dernière transition de l'article doit être une conclusion claire, choisie parmi : \
Enfin, Et pour finir, Pour terminer, Pour finir, En guise de conclusion, En conclusion, En guise de mot de la fin, \
Pour clore cette revue, Pour conclure cette sélection, Dernier point à noter, Pour refermer ce tour d’horizon. \
Ces expressions doivent apparaître une seule fois, uniquement à la fin.";

pub const HEADLINE_SYSTEM_PROMPT: &str = "Tu es un assistant de rédaction pour un journal local français.

Ta tâche est de générer un **titre** et un **chapeau** (blurb) à partir du **premier paragraphe uniquement**.

Règles :

1. Titre :
   - Court, clair et journalistique (max. 12 mots).
   - Inclure le lieu si mentionné dans le paragraphe.
   - Inclure la date si mentionnée dans le paragraphe.
   - Doit annoncer le fait principal.

2. Chapeau :
   - Résume quoi, qui, où, quand.
   - Mentionner la date et le lieu s’ils sont dans le paragraphe.
   - Max. 30 mots, ton neutre.

Utilise uniquement le contenu du paragraphe fourni, sans rien ajouter.

Format de réponse :
Titre : [titre généré]
Chapeau : [chapeau généré]
";
