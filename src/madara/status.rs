//! Free-text publication status classification.

use crate::model::MangaStatus;

const COMPLETED: &[&str] = &[
    "Completed",
    "Completo",
    "Completado",
    "Concluído",
    "Concluido",
    "Finalizado",
    "Achevé",
    "Terminé",
    "Hoàn Thành",
    "مكتملة",
    "مكتمل",
    "已完结",
];

const ONGOING: &[&str] = &[
    "OnGoing",
    "Продолжается",
    "Updating",
    "Em Lançamento",
    "Em andamento",
    "En cours",
    "En cours de publication",
    "Ativo",
    "Lançando",
    "Đang Tiến Hành",
    "Devam Ediyor",
    "In Corso",
    "In Arrivo",
    "مستمرة",
    "مستمر",
    "En Curso",
    "Emision",
    "Curso",
    "En marcha",
    "Publicandose",
    "En emision",
    "连载中",
];

const HIATUS: &[&str] = &[
    "On Hold",
    "Pausado",
    "En espera",
    "Durduruldu",
    "Beklemede",
    "Đang chờ",
    "متوقف",
    "En Pause",
    "Hiatus",
];

const CANCELLED: &[&str] = &[
    "Canceled",
    "Cancelled",
    "Cancelado",
    "İptal Edildi",
    "Đã hủy",
    "ملغي",
    "Abandonné",
];

/// Keyword lists mapping status text to [`MangaStatus`].
///
/// Lists are checked in the order completed, ongoing, hiatus, cancelled;
/// text matching none of them is [`MangaStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTable {
    pub completed: &'static [&'static str],
    pub ongoing: &'static [&'static str],
    pub hiatus: &'static [&'static str],
    pub cancelled: &'static [&'static str],
}

impl Default for StatusTable {
    fn default() -> Self {
        Self {
            completed: COMPLETED,
            ongoing: ONGOING,
            hiatus: HIATUS,
            cancelled: CANCELLED,
        }
    }
}

impl StatusTable {
    /// Classifies trimmed `text`, ignoring case.
    #[must_use]
    pub fn classify(&self, text: &str) -> MangaStatus {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return MangaStatus::Unknown;
        }
        let table = [
            (self.completed, MangaStatus::Completed),
            (self.ongoing, MangaStatus::Ongoing),
            (self.hiatus, MangaStatus::OnHiatus),
            (self.cancelled, MangaStatus::Cancelled),
        ];
        table
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|keyword| keyword.to_lowercase() == text))
            .map_or(MangaStatus::Unknown, |(_, status)| *status)
    }
}
