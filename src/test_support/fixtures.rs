//! Component source fixtures.
//!
//! [`project`] lays out a small project on disk:
//!
//! ```text
//! src/Broken.tsx          parse error
//! src/Button.stories.tsx  excluded by default
//! src/Button.tsx          named + default Button
//! src/Card.tsx            props imported from ./types
//! src/legacy/Old.tsx      excluded by `src/legacy/**`
//! src/types.ts            no components
//! ```

use std::fs;
use std::path::Path;

use tempfile::TempDir;

pub const BUTTON: &str = r#"import React from 'react';

export enum ButtonStatus {
  Active = 'active',
  Disabled = 'disabled',
}

/**
 * Props for {@link Button}.
 */
type ButtonProps = {
  /** Visible text. */
  label: string;
  // greyed out and not clickable
  disabled: boolean;
  /* visual style */ variant: 'primary' | 'secondary';
  /**
   * Free-form labels, e.g. `['new', 'sale']`.
   **/
  tags: string[];
  status: ButtonStatus; // set by the parent
  onClick?: () => void;
};

export const Button = (props: ButtonProps) => (
  <button
    disabled={props.disabled}
    data-variant={props.variant}
    data-status={props.status}
  >
    {props.label}
  </button>
);

export default function ButtonDefault(props: ButtonProps) {
  return (
    <button disabled={props.disabled} data-default="true">
      {props.label}
    </button>
  );
}

export function HelperComponent(props: any) {
  return <span>{props.count ?? 0}</span>;
}
"#;

pub const CARD: &str = r#"import type { CardProps } from './types';

export const Card = ({ title, elevation }: CardProps) => (
  <section data-elevation={elevation}>
    <h2>{title}</h2>
  </section>
);
"#;

pub const TYPES: &str = r#"export type Elevation = 0 | 1 | 2;

/** Card props. Don't nest cards. */
export interface CardProps {
  /** Heading text. */
  title: string;
  /* shadow depth */
  elevation?: number;
}
"#;

pub const STORY: &str = r#"import React from 'react';

export const Story = (props: { label: string }) => (
  <span data-story>{props.label}</span>
);
"#;

pub const LEGACY: &str = r#"export const LegacyButton = ({ label }: { label: string }) => (
  <button data-legacy="true">{label}</button>
);
"#;

pub const BROKEN: &str = r#"export function Broken(props: { label: string }) {
  return <div>{props.label}</div>;
"#;

pub const UNSUPPORTED: &str = r#"import React from 'react';

type Theme = {
  primary: string;
  secondary?: string;
};

type Option = { id: number; label: string };

type Props = {
  label: string;
  theme: Theme;
  options: Option[];
};

export const BadComponent = (props: Props) => <div>{props.label}</div>;
"#;

/// Write `contents` to `root/relative`, creating parent directories.
pub fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// The project laid out in the module docs.
pub fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "src/Button.tsx", BUTTON);
    write(root, "src/Card.tsx", CARD);
    write(root, "src/types.ts", TYPES);
    write(root, "src/Button.stories.tsx", STORY);
    write(root, "src/legacy/Old.tsx", LEGACY);
    write(root, "src/Broken.tsx", BROKEN);
    tmp
}
