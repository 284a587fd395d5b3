use crate::domain::{DirectoryPath, Overlap, RunConfig, StagingArea};
use crate::error::{AppError, InputKind, ValidationError};
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::info;

/// 確認プロンプトで受け付ける唯一の肯定応答。
pub const AFFIRMATIVE: &str = "yes";

/// 入力の確認・配置・検証をまとめて行う。
///
/// 1. 配置場所を表示し、準備ができているかを確認する
/// 2. `--image_dir` / `--mask_dir` が指定されていれば配置場所の中身を置き換える
/// 3. 配置場所の画像・マスクディレクトリが空でないことを確認する
pub fn prepare_inputs<R: BufRead, W: Write>(
    run: &RunConfig,
    staging: &StagingArea,
    reader: &mut R,
    writer: &mut W,
) -> Result<(), AppError> {
    confirm_ready(run, staging, reader, writer)?;

    if let Some(source) = run.image_dir() {
        stage_directory(InputKind::Images, source, staging.raw_images())?;
    }
    if let Some(source) = run.mask_dir() {
        stage_directory(InputKind::Masks, source, staging.masks())?;
    }

    require_non_empty(InputKind::Images, staging.raw_images())?;
    require_non_empty(InputKind::Masks, staging.masks())?;
    Ok(())
}

/// 配置場所を表示し、操作者に確認を求める。
///
/// 空入力や EOF を含め、`yes` 以外の応答はすべて拒否として扱う。
pub fn confirm_ready<R: BufRead, W: Write>(
    run: &RunConfig,
    staging: &StagingArea,
    reader: &mut R,
    writer: &mut W,
) -> Result<(), AppError> {
    writeln!(writer, "パイプラインは以下の場所から入力を読み込みます:")?;
    writeln!(writer, "  画像:   {}", staging.raw_images().display())?;
    writeln!(writer, "  マスク: {}", staging.masks().display())?;
    if let Some(dir) = run.image_dir() {
        writeln!(writer, "  (画像は {} からコピーされます)", dir.display())?;
    }
    if let Some(dir) = run.mask_dir() {
        writeln!(writer, "  (マスクは {} からコピーされます)", dir.display())?;
    }
    writeln!(writer, "各画像には同じファイル名のマスクが必要です。")?;
    write!(writer, "入力の準備はできていますか？ [{}/No]: ", AFFIRMATIVE)?;
    writer.flush()?;

    let mut answer = String::new();
    reader.read_line(&mut answer)?;

    if answer.trim() == AFFIRMATIVE {
        Ok(())
    } else {
        Err(ValidationError::NotConfirmed.into())
    }
}

fn stage_directory(kind: InputKind, source: &Path, destination: &Path) -> Result<(), AppError> {
    let source_dir = existing_directory(kind, source)?;
    if source_dir.is_empty()? {
        return Err(ValidationError::EmptyDirectory {
            kind,
            path: source.to_path_buf(),
        }
        .into());
    }
    match StagingArea::overlap(&source_dir, destination)? {
        Overlap::Disjoint => {}
        Overlap::Same => {
            info!(%kind, path = %destination.display(), "入力は既に配置場所にあるため、コピーしません");
            return Ok(());
        }
        Overlap::Nested => {
            return Err(ValidationError::NestedDirectory {
                kind,
                path: source.to_path_buf(),
                staging: destination.to_path_buf(),
            }
            .into());
        }
    }
    let copied = StagingArea::replace_contents(&source_dir, destination)?;
    info!(%kind, files = copied, destination = %destination.display(), "入力を配置しました");
    Ok(())
}

fn require_non_empty(kind: InputKind, path: &Path) -> Result<(), AppError> {
    let dir = existing_directory(kind, path)?;
    if dir.is_empty()? {
        return Err(ValidationError::EmptyDirectory {
            kind,
            path: path.to_path_buf(),
        }
        .into());
    }
    Ok(())
}

fn existing_directory(kind: InputKind, path: &Path) -> Result<DirectoryPath, AppError> {
    DirectoryPath::new(path).map_err(|_| {
        ValidationError::MissingDirectory {
            kind,
            path: path.to_path_buf(),
        }
        .into()
    })
}
