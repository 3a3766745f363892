//! User-facing messages. The assistant serves Indonesian-speaking learners,
//! so everything a user can read is in Indonesian.

/// Request body could not be understood.
pub const INVALID_MESSAGE: &str = "Format pesan tidak valid";
/// Generic failure while processing a turn.
pub const SERVER_ERROR: &str = "Terjadi kesalahan saat memproses permintaan Anda";
/// Transport failure on the client side.
pub const NETWORK_ERROR: &str = "Koneksi bermasalah. Silakan coba lagi.";
/// Server is missing provider configuration.
pub const CONFIG_ERROR: &str = "Konfigurasi server bermasalah";
/// Attached image exceeds the size limit.
pub const IMAGE_TOO_LARGE: &str = "Ukuran gambar harus kurang dari 10MB";
/// Attached image is not an accepted format.
pub const INVALID_IMAGE_TYPE: &str =
    "Silakan upload file gambar yang valid (JPG, PNG, GIF, atau WebP)";
/// Model produced no text at all.
pub const NO_AI_RESPONSE: &str = "Tidak ada respons dari AI";
/// Material lookup failed.
pub const MATERIALS_FETCH_ERROR: &str = "Gagal mengambil data materi";
/// Message was blank and carried no image.
pub const EMPTY_AFTER_TRIM: &str = "Pesan tidak boleh kosong atau hanya berisi spasi";
/// Retry target has no user message behind it.
pub const NOTHING_TO_RETRY: &str = "Tidak ada pesan yang bisa dikirim ulang";
/// A turn is already streaming.
pub const TURN_IN_PROGRESS: &str = "Tunggu hingga respons sebelumnya selesai";

/// Message shown when the input exceeds `max` characters.
#[must_use]
pub fn message_too_long(max: usize) -> String {
    format!("Pesan terlalu panjang. Maksimal {max} karakter.")
}
