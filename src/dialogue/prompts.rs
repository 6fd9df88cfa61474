//! Localized prompt tables.
//!
//! Each language carries its own table; a key missing from a language's
//! table resolves to the English-UK entry so a lookup can never fail in the
//! middle of a call.

use super::language::Language;
use super::step::{CollectedFields, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKey {
    Welcome,
    Step(Step),
    Goodbye,
    Refusal,
    Apology,
    Recap(RecapLabel),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecapLabel {
    Name,
    Room,
    Fault,
    Date,
    Urgency,
    EmailNotice,
}

impl PromptKey {
    pub const ALL: [PromptKey; 18] = [
        PromptKey::Welcome,
        PromptKey::Step(Step::TenantConfirmation),
        PromptKey::Step(Step::Name),
        PromptKey::Step(Step::Email),
        PromptKey::Step(Step::Room),
        PromptKey::Step(Step::FaultDescription),
        PromptKey::Step(Step::FaultDate),
        PromptKey::Step(Step::Urgency),
        PromptKey::Step(Step::Summary),
        PromptKey::Goodbye,
        PromptKey::Refusal,
        PromptKey::Apology,
        PromptKey::Recap(RecapLabel::Name),
        PromptKey::Recap(RecapLabel::Room),
        PromptKey::Recap(RecapLabel::Fault),
        PromptKey::Recap(RecapLabel::Date),
        PromptKey::Recap(RecapLabel::Urgency),
        PromptKey::Recap(RecapLabel::EmailNotice),
    ];
}

type PromptTable = &'static [(PromptKey, &'static str)];

use PromptKey::{Apology, Goodbye, Recap, Refusal, Step as S, Welcome};
use RecapLabel as R;

const EN_GB: PromptTable = &[
    (Welcome, "Welcome to Agent Fix It. Please select your preferred language. Press 1 for English, 2 for French, 3 for Spanish, 4 for German, 5 for Italian, 6 for Portuguese, or 7 for Dutch."),
    (S(Step::TenantConfirmation), "Are you the tenant holder? Please say yes or no."),
    (S(Step::Name), "Please state your full name."),
    (S(Step::Email), "Please provide your email address."),
    (S(Step::Room), "Which room is the fault in?"),
    (S(Step::FaultDescription), "Please describe the fault."),
    (S(Step::FaultDate), "When did this fault occur?"),
    (S(Step::Urgency), "How urgent is this fault? Please say low, medium, or high."),
    (S(Step::Summary), "Let me summarize the information we have collected."),
    (Goodbye, "Thank you for your call. A summary will be sent to your email."),
    (Refusal, "I apologize, but this service is only available for tenants. Goodbye."),
    (Apology, "We apologize, but we encountered an error. Please try your call again later."),
    (Recap(R::Name), "Your name:"),
    (Recap(R::Room), "Room:"),
    (Recap(R::Fault), "Fault:"),
    (Recap(R::Date), "Date:"),
    (Recap(R::Urgency), "Urgency:"),
    (Recap(R::EmailNotice), "A summary will be sent to your email at"),
];

const FR: PromptTable = &[
    (Welcome, "Bienvenue chez Agent Fix It. Veuillez sélectionner votre langue préférée. Appuyez sur 1 pour l'anglais, 2 pour le français, 3 pour l'espagnol, 4 pour l'allemand, 5 pour l'italien, 6 pour le portugais, ou 7 pour le néerlandais."),
    (S(Step::TenantConfirmation), "Êtes-vous le locataire? Veuillez dire oui ou non."),
    (S(Step::Name), "Veuillez indiquer votre nom complet."),
    (S(Step::Email), "Veuillez fournir votre adresse e-mail."),
    (S(Step::Room), "Dans quelle pièce se trouve le problème?"),
    (S(Step::FaultDescription), "Veuillez décrire le problème."),
    (S(Step::FaultDate), "Quand ce problème est-il survenu?"),
    (S(Step::Urgency), "Quelle est l'urgence de ce problème? Veuillez dire faible, moyen ou élevé."),
    (S(Step::Summary), "Permettez-moi de résumer les informations que nous avons recueillies."),
    (Goodbye, "Merci pour votre appel. Un résumé sera envoyé à votre adresse e-mail."),
    (Refusal, "Nous sommes désolés, mais ce service est réservé aux locataires. Au revoir."),
    (Recap(R::Name), "Votre nom :"),
    (Recap(R::Room), "Pièce :"),
    (Recap(R::Fault), "Problème :"),
    (Recap(R::Date), "Date :"),
    (Recap(R::Urgency), "Urgence :"),
    (Recap(R::EmailNotice), "Un résumé sera envoyé à votre adresse e-mail"),
];

const ES: PromptTable = &[
    (Welcome, "Bienvenido a Agent Fix It. Por favor, seleccione su idioma preferido. Presione 1 para inglés, 2 para francés, 3 para español, 4 para alemán, 5 para italiano, 6 para portugués o 7 para holandés."),
    (S(Step::TenantConfirmation), "¿Es usted el inquilino? Por favor, diga sí o no."),
    (S(Step::Name), "Por favor, indique su nombre completo."),
    (S(Step::Email), "Por favor, proporcione su dirección de correo electrónico."),
    (S(Step::Room), "¿En qué habitación está la avería?"),
    (S(Step::FaultDescription), "Por favor, describa la avería."),
    (S(Step::FaultDate), "¿Cuándo ocurrió esta avería?"),
    (S(Step::Urgency), "¿Qué tan urgente es esta avería? Por favor, diga bajo, medio o alto."),
    (S(Step::Summary), "Permítame resumir la información que hemos recopilado."),
    (Goodbye, "Gracias por su llamada. Se enviará un resumen a su correo electrónico."),
    (Refusal, "Lo sentimos, pero este servicio solo está disponible para inquilinos. Adiós."),
    (Recap(R::Name), "Su nombre:"),
    (Recap(R::Room), "Habitación:"),
    (Recap(R::Fault), "Avería:"),
    (Recap(R::Date), "Fecha:"),
    (Recap(R::Urgency), "Urgencia:"),
    (Recap(R::EmailNotice), "Se enviará un resumen a su correo electrónico"),
];

const DE: PromptTable = &[
    (Welcome, "Willkommen bei Agent Fix It. Bitte wählen Sie Ihre bevorzugte Sprache. Drücken Sie 1 für Englisch, 2 für Französisch, 3 für Spanisch, 4 für Deutsch, 5 für Italienisch, 6 für Portugiesisch oder 7 für Niederländisch."),
    (S(Step::TenantConfirmation), "Sind Sie der Mieter? Bitte sagen Sie ja oder nein."),
    (S(Step::Name), "Bitte nennen Sie Ihren vollständigen Namen."),
    (S(Step::Email), "Bitte geben Sie Ihre E-Mail-Adresse an."),
    (S(Step::Room), "In welchem Raum befindet sich der Fehler?"),
    (S(Step::FaultDescription), "Bitte beschreiben Sie den Fehler."),
    (S(Step::FaultDate), "Wann ist dieser Fehler aufgetreten?"),
    (S(Step::Urgency), "Wie dringend ist dieser Fehler? Bitte sagen Sie niedrig, mittel oder hoch."),
    (S(Step::Summary), "Lassen Sie mich die gesammelten Informationen zusammenfassen."),
    (Goodbye, "Vielen Dank für Ihren Anruf. Eine Zusammenfassung wird an Ihre E-Mail gesendet."),
    (Refusal, "Es tut uns leid, aber dieser Dienst steht nur Mietern zur Verfügung. Auf Wiederhören."),
    (Recap(R::Name), "Ihr Name:"),
    (Recap(R::Room), "Raum:"),
    (Recap(R::Fault), "Fehler:"),
    (Recap(R::Date), "Datum:"),
    (Recap(R::Urgency), "Dringlichkeit:"),
    (Recap(R::EmailNotice), "Eine Zusammenfassung wird gesendet an"),
];

const IT: PromptTable = &[
    (Welcome, "Benvenuto in Agent Fix It. Seleziona la lingua preferita. Premi 1 per inglese, 2 per francese, 3 per spagnolo, 4 per tedesco, 5 per italiano, 6 per portoghese o 7 per olandese."),
    (S(Step::TenantConfirmation), "Sei l'inquilino? Per favore, rispondi sì o no."),
    (S(Step::Name), "Per favore, indica il tuo nome completo."),
    (S(Step::Email), "Per favore, fornisci il tuo indirizzo email."),
    (S(Step::Room), "In quale stanza si trova il guasto?"),
    (S(Step::FaultDescription), "Per favore, descrivi il guasto."),
    (S(Step::FaultDate), "Quando si è verificato questo guasto?"),
    (S(Step::Urgency), "Quanto è urgente questo guasto? Per favore, rispondi basso, medio o alto."),
    (S(Step::Summary), "Permettimi di riassumere le informazioni raccolte."),
    (Goodbye, "Grazie per la tua chiamata. Un riepilogo sarà inviato alla tua email."),
    (Refusal, "Ci dispiace, ma questo servizio è riservato agli inquilini. Arrivederci."),
    (Recap(R::Name), "Il tuo nome:"),
    (Recap(R::Room), "Stanza:"),
    (Recap(R::Fault), "Guasto:"),
    (Recap(R::Date), "Data:"),
    (Recap(R::Urgency), "Urgenza:"),
    (Recap(R::EmailNotice), "Un riepilogo sarà inviato alla tua email"),
];

const PT: PromptTable = &[
    (Welcome, "Bem-vindo ao Agent Fix It. Por favor, selecione seu idioma preferido. Pressione 1 para inglês, 2 para francês, 3 para espanhol, 4 para alemão, 5 para italiano, 6 para português ou 7 para holandês."),
    (S(Step::TenantConfirmation), "Você é o inquilino? Por favor, diga sim ou não."),
    (S(Step::Name), "Por favor, indique seu nome completo."),
    (S(Step::Email), "Por favor, forneça seu endereço de e-mail."),
    (S(Step::Room), "Em qual cômodo está o defeito?"),
    (S(Step::FaultDescription), "Por favor, descreva o defeito."),
    (S(Step::FaultDate), "Quando ocorreu este defeito?"),
    (S(Step::Urgency), "Qual a urgência deste defeito? Por favor, diga baixo, médio ou alto."),
    (S(Step::Summary), "Deixe-me resumir as informações que coletamos."),
    (Goodbye, "Obrigado pela sua ligação. Um resumo será enviado para seu e-mail."),
    (Refusal, "Lamentamos, mas este serviço está disponível apenas para inquilinos. Adeus."),
    (Recap(R::Name), "Seu nome:"),
    (Recap(R::Room), "Cômodo:"),
    (Recap(R::Fault), "Defeito:"),
    (Recap(R::Date), "Data:"),
    (Recap(R::Urgency), "Urgência:"),
    (Recap(R::EmailNotice), "Um resumo será enviado para seu e-mail"),
];

const NL: PromptTable = &[
    (Welcome, "Welkom bij Agent Fix It. Selecteer uw voorkeurstaal. Druk op 1 voor Engels, 2 voor Frans, 3 voor Spaans, 4 voor Duits, 5 voor Italiaans, 6 voor Portugees of 7 voor Nederlands."),
    (S(Step::TenantConfirmation), "Bent u de huurder? Zeg alstublieft ja of nee."),
    (S(Step::Name), "Geef alstublieft uw volledige naam op."),
    (S(Step::Email), "Geef alstublieft uw e-mailadres op."),
    (S(Step::Room), "In welke kamer bevindt zich het defect?"),
    (S(Step::FaultDescription), "Beschrijf alstublieft het defect."),
    (S(Step::FaultDate), "Wanneer is dit defect opgetreden?"),
    (S(Step::Urgency), "Hoe dringend is dit defect? Zeg alstublieft laag, gemiddeld of hoog."),
    (S(Step::Summary), "Laat me de verzamelde informatie samenvatten."),
    (Goodbye, "Bedankt voor uw oproep. Er wordt een samenvatting naar uw e-mail gestuurd."),
    (Refusal, "Het spijt ons, maar deze dienst is alleen beschikbaar voor huurders. Tot ziens."),
    (Recap(R::Name), "Uw naam:"),
    (Recap(R::Room), "Kamer:"),
    (Recap(R::Fault), "Defect:"),
    (Recap(R::Date), "Datum:"),
    (Recap(R::Urgency), "Urgentie:"),
    (Recap(R::EmailNotice), "Er wordt een samenvatting gestuurd naar"),
];

fn table(language: Language) -> PromptTable {
    match language {
        Language::EnglishUk => EN_GB,
        Language::French => FR,
        Language::Spanish => ES,
        Language::German => DE,
        Language::Italian => IT,
        Language::Portuguese => PT,
        Language::Dutch => NL,
    }
}

/// Entry authored for exactly this language, if any.
pub fn lookup(language: Language, key: PromptKey) -> Option<&'static str> {
    table(language)
        .iter()
        .find(|(k, text)| *k == key && !text.is_empty())
        .map(|(_, text)| *text)
}

pub fn prompt(language: Language, key: PromptKey) -> &'static str {
    lookup(language, key)
        .or_else(|| lookup(Language::EnglishUk, key))
        .unwrap_or_default()
}

/// Spoken recap of everything collected; absent answers read as empty.
pub fn recap(language: Language, fields: &CollectedFields) -> String {
    let label = |l: RecapLabel| prompt(language, PromptKey::Recap(l));
    let value = |v: &Option<String>| v.clone().unwrap_or_default();
    format!(
        "{} {}. {} {}. {} {}. {} {}. {} {}. {} {}.",
        label(RecapLabel::Name),
        value(&fields.tenant_name),
        label(RecapLabel::Room),
        value(&fields.room),
        label(RecapLabel::Fault),
        value(&fields.fault_description),
        label(RecapLabel::Date),
        value(&fields.fault_date),
        label(RecapLabel::Urgency),
        fields.urgency.map(|u| u.as_str()).unwrap_or_default(),
        label(RecapLabel::EmailNotice),
        value(&fields.email),
    )
}
